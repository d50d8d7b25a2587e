//! Shower shape cuts which stand down for saturated electrons
//!
//! Very energetic electrons can saturate the crystals of the electromagnetic
//! calorimeter, which distorts their shower shape. The HEEP selection thus
//! considers that an electron passes its shower shape cuts if more crystals
//! are saturated in the 5x5 block around its seed than a configured limit.
//!
//! Thresholds differ between the barrel and the endcaps of the detector.

use crate::numeric::Float;

/// |η| of the supercluster below which an electron is considered in the barrel
pub const BARREL_ETA_CUTOFF: Float = 1.479;

/// Precomputed shower shape quantities of an electron
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ShowerShape {
    /// Pseudorapidity of the supercluster position
    pub sc_eta: Float,

    /// Energy of the 1x5 strip containing the seed (full 5x5 clustering)
    pub e1x5: Float,

    /// Highest energy among the 2x5 strips around the seed
    pub e2x5_max: Float,

    /// Energy of the 5x5 block centered on the seed
    pub e5x5: Float,

    /// Crystal-based η width of the shower
    pub sigma_ieta_ieta: Float,

    /// Number of saturated crystals in the 5x5 block centered on the seed
    pub nr_sat_crys_5x5: i32,
}
//
impl ShowerShape {
    /// Truth that the electron lies in the barrel
    pub fn is_barrel(&self) -> bool {
        self.sc_eta.abs() < BARREL_ETA_CUTOFF
    }
}

/// A threshold with distinct values in the barrel and in the endcaps
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EbEeCutValues<T> {
    barrel: T,
    endcap: T,
}
//
impl<T: Copy> EbEeCutValues<T> {
    /// Set up a threshold from its barrel and endcap values
    pub fn new(barrel: T, endcap: T) -> Self {
        Self { barrel, endcap }
    }

    /// Threshold applicable to an electron
    pub fn get(&self, shape: &ShowerShape) -> T {
        if shape.is_barrel() {
            self.barrel
        } else {
            self.endcap
        }
    }
}

/// A cut applied to one electron
pub trait CutApplicator {
    /// Truth that the electron passes the cut
    fn passes(&self, shape: &ShowerShape) -> bool;

    /// Value which the cut is applied to, for monitoring
    fn value(&self, shape: &ShowerShape) -> Float;

    /// Cut outcome along with the monitored value, as stored in cut flows
    fn evaluate(&self, shape: &ShowerShape) -> (bool, Float) {
        (self.passes(shape), self.value(shape))
    }
}

/// Truth that an electron has too many saturated crystals to be cut upon
fn is_saturated(shape: &ShowerShape, max_nr_sat_crys: &EbEeCutValues<i32>) -> bool {
    let saturated = shape.nr_sat_crys_5x5 > max_nr_sat_crys.get(shape);
    if saturated {
        tracing::debug!(
            nr_sat_crys = shape.nr_sat_crys_5x5,
            "shower shape cut skipped for saturated electron"
        );
    }
    saturated
}

/// Minimal E1x5/E5x5 or E2x5/E5x5 shower shape cut
#[derive(Clone, Copy, Debug)]
pub struct E2x5OverE5x5WithSatCut {
    /// Minimal E1x5/E5x5
    pub min_e1x5_over_e5x5: EbEeCutValues<Float>,

    /// Minimal E2x5/E5x5
    pub min_e2x5_over_e5x5: EbEeCutValues<Float>,

    /// Saturated crystal count above which the cut always passes
    pub max_nr_sat_crys_5x5: EbEeCutValues<i32>,
}
//
impl CutApplicator for E2x5OverE5x5WithSatCut {
    fn passes(&self, shape: &ShowerShape) -> bool {
        if is_saturated(shape, &self.max_nr_sat_crys_5x5) {
            return true;
        }
        let ratio = |e: Float| {
            if shape.e5x5 != 0. {
                e / shape.e5x5
            } else {
                0.
            }
        };
        ratio(shape.e1x5) > self.min_e1x5_over_e5x5.get(shape)
            || ratio(shape.e2x5_max) > self.min_e2x5_over_e5x5.get(shape)
    }

    /// Monitored value is E2x5/E1x5
    ///
    /// This is neither of the ratios that the cut is applied to, so it cannot
    /// tell on its own whether the cut passed. It is kept as is because it is
    /// the value that published cut flows carry for this cut. It is not
    /// finite when E1x5 is zero.
    ///
    fn value(&self, shape: &ShowerShape) -> Float {
        shape.e2x5_max / shape.e1x5
    }
}

/// Maximal σiηiη shower shape cut
#[derive(Clone, Copy, Debug)]
pub struct SigmaIEtaIEtaWithSatCut {
    /// Maximal σiηiη
    pub max_sigma_ieta_ieta: EbEeCutValues<Float>,

    /// Saturated crystal count above which the cut always passes
    pub max_nr_sat_crys_5x5: EbEeCutValues<i32>,
}
//
impl CutApplicator for SigmaIEtaIEtaWithSatCut {
    fn passes(&self, shape: &ShowerShape) -> bool {
        is_saturated(shape, &self.max_nr_sat_crys_5x5)
            || shape.sigma_ieta_ieta < self.max_sigma_ieta_ieta.get(shape)
    }

    fn value(&self, shape: &ShowerShape) -> Float {
        shape.sigma_ieta_ieta
    }
}
