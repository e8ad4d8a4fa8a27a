//! Fault-system ("inversion") source sets.
//!
//! A system set holds one pre-indexed table of many thousands of
//! ruptures that share fault-section geometry. Rather than fanning out
//! per source, the pipeline processes the table in bulk: per-section
//! distances are computed once against the site, a bitset of in-range
//! sections pre-filters the table, and the selected ruptures are
//! materialized into a single input list in table order.

use std::sync::Arc;

use fixedbitset::FixedBitSet;

use crate::calc::{HazardInput, InputList};
use crate::errors::{RSHMError, RSHMResult};
use crate::model::surface::{hypocentral_depth, Distance, RuptureSurface};
use crate::model::source_set::GmmSet;
use crate::model::SourceType;
use crate::site::Site;

/// One row of the system rupture table.
#[derive(Debug, Clone)]
pub struct SystemRupture {
    /// unit: 1/yr
    pub rate: f64,
    pub mag: f64,
    /// unit: decimal degrees
    pub rake: f64,
    /// unit: decimal degrees
    pub dip: f64,
    /// unit: km
    pub width: f64,
    /// unit: km
    pub z_top: f64,
    /// Participating sections, indexed into the set's section list.
    pub sections: FixedBitSet,
}

/// A source set backed by a pre-indexed rupture table.
#[derive(Debug)]
pub struct SystemSourceSet {
    name: String,
    id: u32,
    weight: f64,
    gmm_set: GmmSet,
    sections: Vec<Arc<dyn RuptureSurface>>,
    ruptures: Vec<SystemRupture>,
}

impl SystemSourceSet {
    pub fn builder() -> SystemSourceSetBuilder {
        SystemSourceSetBuilder::default()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn gmm_set(&self) -> &GmmSet {
        &self.gmm_set
    }

    pub fn source_type(&self) -> SourceType {
        SourceType::System
    }

    pub fn sections(&self) -> usize {
        self.sections.len()
    }

    pub fn ruptures(&self) -> &[SystemRupture] {
        &self.ruptures
    }

    /// Materialize inputs for every rupture with a section within
    /// `max_distance` of the site, in table order.
    ///
    /// A rupture's distance metrics come from its participating
    /// sections: rJB and rRup are minima over the sections, rX follows
    /// the rRup-governing section.
    pub fn to_inputs(&self, site: &Site, max_distance: f64) -> RSHMResult<InputList> {
        let distances: Vec<Distance> = self
            .sections
            .iter()
            .map(|s| s.distance_to(&site.location))
            .collect();

        let mut in_range = FixedBitSet::with_capacity(self.sections.len());
        for (index, d) in distances.iter().enumerate() {
            if !(d.r_jb.is_finite() && d.r_rup.is_finite() && d.r_x.is_finite()) {
                return Err(RSHMError::NonFiniteDistance {
                    name: self.name.clone(),
                    lat: site.location.lat,
                    lon: site.location.lon,
                });
            }
            if d.r_jb <= max_distance {
                in_range.insert(index);
            }
        }

        let mut inputs = InputList::new(&self.name);
        for (index, rupture) in self.ruptures.iter().enumerate() {
            let mut r_jb = f64::INFINITY;
            let mut r_rup = f64::INFINITY;
            let mut r_x = f64::NAN;
            let mut selected = false;
            for section in rupture.sections.ones() {
                let d = &distances[section];
                selected |= in_range.contains(section);
                r_jb = r_jb.min(d.r_jb);
                if d.r_rup < r_rup {
                    r_rup = d.r_rup;
                    r_x = d.r_x;
                }
            }
            if !selected {
                continue;
            }
            if !(rupture.rate.is_finite() && rupture.rate >= 0.0) {
                return Err(RSHMError::InvalidRate {
                    name: self.name.clone(),
                    index,
                    rate: rupture.rate,
                });
            }
            if !rupture.mag.is_finite() {
                return Err(RSHMError::InvalidMagnitude {
                    name: self.name.clone(),
                    index,
                    mag: rupture.mag,
                });
            }
            inputs.add(HazardInput {
                rate: rupture.rate,
                mag: rupture.mag,
                r_jb,
                r_rup,
                r_x,
                dip: rupture.dip,
                width: rupture.width,
                z_top: rupture.z_top,
                z_hyp: hypocentral_depth(rupture.dip, rupture.width, rupture.z_top),
                rake: rupture.rake,
                vs30: site.vs30,
                vs_inferred: site.vs_inferred,
                z1p0: site.z1p0,
                z2p5: site.z2p5,
            });
        }
        Ok(inputs)
    }
}

/// Single-use builder of [`SystemSourceSet`]s.
#[derive(Debug, Default)]
pub struct SystemSourceSetBuilder {
    name: Option<String>,
    id: u32,
    weight: Option<f64>,
    gmm_set: Option<GmmSet>,
    sections: Vec<Arc<dyn RuptureSurface>>,
    ruptures: Vec<SystemRupture>,
    built: bool,
}

impl SystemSourceSetBuilder {
    pub fn name(&mut self, name: &str) -> &mut Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn id(&mut self, id: u32) -> &mut Self {
        self.id = id;
        self
    }

    pub fn weight(&mut self, weight: f64) -> &mut Self {
        assert!(
            weight > 0.0 && weight <= 1.0,
            "set weight must be in (0, 1], got {}",
            weight
        );
        self.weight = Some(weight);
        self
    }

    pub fn gmms(&mut self, gmm_set: GmmSet) -> &mut Self {
        self.gmm_set = Some(gmm_set);
        self
    }

    /// Register a fault section; returns its index for rupture bitsets.
    pub fn section(&mut self, surface: Arc<dyn RuptureSurface>) -> usize {
        self.sections.push(surface);
        self.sections.len() - 1
    }

    /// # Panics
    ///
    /// Panics if the rupture references a section that has not been
    /// registered, or participates in no section at all.
    pub fn rupture(&mut self, rupture: SystemRupture) -> &mut Self {
        assert!(
            rupture.sections.count_ones(..) > 0,
            "system rupture participates in no sections"
        );
        assert!(
            rupture.sections.ones().all(|i| i < self.sections.len()),
            "system rupture references an unregistered section"
        );
        self.ruptures.push(rupture);
        self
    }

    /// # Panics
    ///
    /// Panics if the builder has already been used or is incomplete.
    pub fn build(&mut self) -> SystemSourceSet {
        assert!(!self.built, "this builder has already been used");
        self.built = true;
        let name = self.name.take().expect("system set name not set");
        let gmm_set = self.gmm_set.take().expect("system set has no gmms");
        assert!(!self.ruptures.is_empty(), "system set {} is empty", name);
        SystemSourceSet {
            name,
            id: self.id,
            weight: self.weight.unwrap_or(1.0),
            gmm_set,
            sections: std::mem::take(&mut self.sections),
            ruptures: std::mem::take(&mut self.ruptures),
        }
    }
}
