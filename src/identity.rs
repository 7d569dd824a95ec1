//! Cached board identity reported through the USB descriptors.
//!
//! Boards with a strap divider use [`StrapDetector`], which samples the
//! strap once at boot and keeps the result. Boards without one use
//! [`FixedIdentity`], whose answers are compiled in. Both are driven through
//! [`BoardIdentity`] so descriptor code does not care which one it has.
use log::{info, warn};

use crate::adc::{check_reading, StrapSampler, WaitPolicy};
use crate::revision::{bcd, Detection, RevisionCode};
use crate::{Result, BOARD_REVISION_MAJOR, BOARD_REVISION_MINOR, NO_READING};

pub const PRODUCTION_MANUFACTURER: &str = "Great Scott Gadgets";
pub const PRODUCTION_PRODUCT: &str = "Cynthion Apollo Debugger";
pub const COMMUNITY_MANUFACTURER: &str = "Apollo Project";
pub const COMMUNITY_PRODUCT: &str = "Apollo Debugger";

/// Manufacturer string for the given production flag.
pub const fn manufacturer_string(production: bool) -> &'static str {
    if production {
        PRODUCTION_MANUFACTURER
    } else {
        COMMUNITY_MANUFACTURER
    }
}

/// Product string for the given production flag.
pub const fn product_string(production: bool) -> &'static str {
    if production {
        PRODUCTION_PRODUCT
    } else {
        COMMUNITY_PRODUCT
    }
}

pub trait BoardIdentity {
    /// Sample the board identity. Run once during init, before any of the
    /// accessors are read.
    fn detect(&mut self) -> Result<()>;

    /// Board revision in bcdDevice format.
    fn board_revision(&self) -> u16;

    fn manufacturer(&self) -> &'static str;

    fn product(&self) -> &'static str;

    /// Raw strap reading, for diagnostics.
    fn adc_reading(&self) -> u16;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DetectConfig {
    /// Wait policy for the strap conversion.
    pub wait: WaitPolicy,
    /// Report this revision instead of the detected one.
    pub pinned_revision: Option<RevisionCode>,
}

impl DetectConfig {
    pub fn wait(mut self, wait: WaitPolicy) -> Self {
        self.wait = wait;
        self
    }

    pub fn pin_revision(mut self, revision: RevisionCode) -> Self {
        self.pinned_revision = Some(revision);
        self
    }
}

/// Result of the last detection. Revision and production flag are only
/// ever written together.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Identity {
    reading: u16,
    production: bool,
    revision: RevisionCode,
}

impl Default for Identity {
    fn default() -> Self {
        Self {
            reading: NO_READING,
            production: false,
            revision: RevisionCode::Unknown,
        }
    }
}

impl From<Detection> for Identity {
    fn from(d: Detection) -> Self {
        Self {
            reading: d.reading,
            production: d.production,
            revision: d.revision,
        }
    }
}

impl Identity {
    pub fn reading(&self) -> u16 {
        self.reading
    }

    pub fn production(&self) -> bool {
        self.production
    }

    pub fn revision(&self) -> RevisionCode {
        self.revision
    }
}

/// Identity read from the strap divider.
pub struct StrapDetector<S> {
    sampler: S,
    config: DetectConfig,
    identity: Identity,
}

impl<S> StrapDetector<S>
where
    S: StrapSampler,
{
    pub fn new(sampler: S, config: DetectConfig) -> Self {
        Self {
            sampler,
            config,
            identity: Identity::default(),
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn config(&self) -> &DetectConfig {
        &self.config
    }

    pub fn free(self) -> S {
        self.sampler
    }
}

impl<S> BoardIdentity for StrapDetector<S>
where
    S: StrapSampler,
{
    fn detect(&mut self) -> Result<()> {
        let reading = match self
            .sampler
            .sample()
            .and_then(|reading| check_reading(reading.into()))
        {
            Ok(reading) => reading,
            Err(e) => {
                warn!("Board revision detection failed: {}", e);
                self.identity = Identity::default();
                return Err(e);
            }
        };

        let detection = Detection::from_reading(reading);
        info!(
            "Strap reading {} ({}%, folded {}%): {} {}",
            detection.reading,
            detection.percentage,
            detection.folded,
            detection.revision,
            if detection.production { "production" } else { "prototype" }
        );
        self.identity = detection.into();
        Ok(())
    }

    fn board_revision(&self) -> u16 {
        self.config
            .pinned_revision
            .unwrap_or(self.identity.revision)
            .bcd()
    }

    fn manufacturer(&self) -> &'static str {
        manufacturer_string(self.identity.production)
    }

    fn product(&self) -> &'static str {
        product_string(self.identity.production)
    }

    fn adc_reading(&self) -> u16 {
        self.identity.reading
    }
}

/// Identity of a board without a strap divider.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixedIdentity {
    major: u8,
    minor: u8,
}

impl FixedIdentity {
    pub const fn new(major: u8, minor: u8) -> Self {
        Self { major, minor }
    }
}

impl Default for FixedIdentity {
    fn default() -> Self {
        Self::new(BOARD_REVISION_MAJOR, BOARD_REVISION_MINOR)
    }
}

impl BoardIdentity for FixedIdentity {
    fn detect(&mut self) -> Result<()> {
        Ok(())
    }

    fn board_revision(&self) -> u16 {
        bcd(self.major, self.minor)
    }

    fn manufacturer(&self) -> &'static str {
        COMMUNITY_MANUFACTURER
    }

    fn product(&self) -> &'static str {
        COMMUNITY_PRODUCT
    }

    fn adc_reading(&self) -> u16 {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    /// Replays queued sample results, repeating the last one.
    struct Replay {
        results: Vec<Result<u16>>,
        calls: usize,
    }

    impl Replay {
        fn new(results: &[Result<u16>]) -> Self {
            Self {
                results: results.to_vec(),
                calls: 0,
            }
        }
    }

    impl StrapSampler for Replay {
        fn sample(&mut self) -> Result<u16> {
            let i = self.calls.min(self.results.len() - 1);
            self.calls += 1;
            self.results[i]
        }
    }

    fn detector(results: &[Result<u16>]) -> StrapDetector<Replay> {
        StrapDetector::new(Replay::new(results), DetectConfig::default())
    }

    #[test]
    fn defaults_before_detection() {
        let d = detector(&[Ok(0)]);
        assert_eq!(d.board_revision(), RevisionCode::Unknown.bcd());
        assert_eq!(d.adc_reading(), NO_READING);
        assert_eq!(d.manufacturer(), COMMUNITY_MANUFACTURER);
        assert_eq!(d.product(), COMMUNITY_PRODUCT);
    }

    #[test]
    fn detection_reports_strap_revision() {
        // 21% of full scale
        let mut d = detector(&[Ok(880)]);
        d.detect().unwrap();
        assert_eq!(d.identity().revision(), RevisionCode::Rev1_4);
        assert_eq!(d.board_revision(), 0x0104);
        assert_eq!(d.adc_reading(), 880);
        assert!(!d.identity().production());
    }

    #[test]
    fn production_board_strings() {
        // 70% of full scale folds to 30%
        let mut d = detector(&[Ok(2867)]);
        d.detect().unwrap();
        assert!(d.identity().production());
        assert_eq!(d.identity().revision(), RevisionCode::Rev1_1);
        assert_eq!(d.manufacturer(), PRODUCTION_MANUFACTURER);
        assert_eq!(d.product(), PRODUCTION_PRODUCT);
    }

    #[test]
    fn detecting_twice_is_idempotent() {
        let mut d = detector(&[Ok(2867)]);
        d.detect().unwrap();
        let first = *d.identity();
        d.detect().unwrap();
        assert_eq!(*d.identity(), first);
    }

    #[test]
    fn redetection_overwrites_everything() {
        let mut d = detector(&[Ok(2867), Ok(0)]);
        d.detect().unwrap();
        d.detect().unwrap();
        assert!(!d.identity().production());
        assert_eq!(d.identity().revision(), RevisionCode::Rev0_6);
        assert_eq!(d.adc_reading(), 0);
    }

    #[test]
    fn failed_detection_resets_identity() {
        let timeout = Error::Timeout { polls: 3 };
        let mut d = detector(&[Ok(2867), Err(timeout)]);
        d.detect().unwrap();
        assert_eq!(d.detect(), Err(timeout));
        assert_eq!(*d.identity(), Identity::default());
        assert_eq!(d.manufacturer(), COMMUNITY_MANUFACTURER);
    }

    #[test]
    fn out_of_range_sample_resets_identity() {
        let mut d = detector(&[Ok(2867), Ok(4096)]);
        d.detect().unwrap();
        assert_eq!(d.detect(), Err(Error::OutOfRange { reading: 4096 }));
        assert_eq!(*d.identity(), Identity::default());
        assert_eq!(d.board_revision(), RevisionCode::Unknown.bcd());
        assert_eq!(d.manufacturer(), COMMUNITY_MANUFACTURER);

        let mut d = detector(&[Ok(10000)]);
        assert_eq!(d.detect(), Err(Error::OutOfRange { reading: 10000 }));
        assert_eq!(d.adc_reading(), NO_READING);
    }

    #[test]
    fn pinned_revision_overrides_detection() {
        let config = DetectConfig::default().pin_revision(RevisionCode::Rev1_4);
        let mut d = StrapDetector::new(Replay::new(&[Ok(0)]), config);
        d.detect().unwrap();
        assert_eq!(d.identity().revision(), RevisionCode::Rev0_6);
        assert_eq!(d.board_revision(), RevisionCode::Rev1_4.bcd());
    }

    #[test]
    fn strings_follow_production_flag_only() {
        for production in [false, true] {
            assert_eq!(
                manufacturer_string(production),
                if production { "Great Scott Gadgets" } else { "Apollo Project" }
            );
            assert_eq!(
                product_string(production),
                if production { "Cynthion Apollo Debugger" } else { "Apollo Debugger" }
            );
        }
    }

    #[test]
    fn fixed_identity() {
        let mut id = FixedIdentity::new(0, 7);
        id.detect().unwrap();
        assert_eq!(id.board_revision(), 0x0007);
        assert_eq!(id.adc_reading(), 0);
        assert_eq!(id.manufacturer(), "Apollo Project");
        assert_eq!(id.product(), "Apollo Debugger");
        assert_eq!(FixedIdentity::default().board_revision(), 0x0104);
    }
}
