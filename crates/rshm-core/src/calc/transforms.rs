//! The per-source data transforms of the pipeline.
//!
//! Each stage is a pure function of its inputs and the captured site
//! and config; the orchestration in `pipeline` composes them
//! per-source, sequentially or in parallel, to identical results.

use crate::calc::config::CalcConfig;
use crate::calc::curves::{ClusterCurves, HazardCurves};
use crate::calc::ground_motions::{ClusterGroundMotions, GroundMotions};
use crate::calc::inputs::{ClusterInputs, HazardInput, InputList};
use crate::data::{cluster_exceedance, XySequence};
use crate::errors::{RSHMError, RSHMResult};
use crate::gmm::GmmTable;
use crate::model::cluster::ClusterSource;
use crate::model::source::{Rupture, Source};
use crate::model::surface::hypocentral_depth;
use crate::model::system::SystemSourceSet;
use crate::site::Site;

/// Stage 1: expand a source into per-rupture inputs against `site`.
pub(crate) fn source_to_inputs(source: &Source, site: &Site) -> RSHMResult<InputList> {
    ruptures_to_inputs(source.name(), source.ruptures(), site)
}

fn ruptures_to_inputs(name: &str, ruptures: &[Rupture], site: &Site) -> RSHMResult<InputList> {
    if ruptures.is_empty() {
        return Err(RSHMError::EmptySource {
            name: name.to_string(),
        });
    }
    let mut inputs = InputList::new(name);
    for (index, rupture) in ruptures.iter().enumerate() {
        if !(rupture.rate.is_finite() && rupture.rate >= 0.0) {
            return Err(RSHMError::InvalidRate {
                name: name.to_string(),
                index,
                rate: rupture.rate,
            });
        }
        if !rupture.mag.is_finite() {
            return Err(RSHMError::InvalidMagnitude {
                name: name.to_string(),
                index,
                mag: rupture.mag,
            });
        }

        let surface = rupture.surface.as_ref();
        let distances = surface.distance_to(&site.location);
        if !(distances.r_jb.is_finite()
            && distances.r_rup.is_finite()
            && distances.r_x.is_finite())
        {
            return Err(RSHMError::NonFiniteDistance {
                name: name.to_string(),
                lat: site.location.lat,
                lon: site.location.lon,
            });
        }

        let dip = surface.dip();
        let width = surface.width();
        let z_top = surface.depth();
        inputs.add(HazardInput {
            rate: rupture.rate,
            mag: rupture.mag,
            r_jb: distances.r_jb,
            r_rup: distances.r_rup,
            r_x: distances.r_x,
            dip,
            width,
            z_top,
            z_hyp: hypocentral_depth(dip, width, z_top),
            rake: rupture.rake,
            vs30: site.vs30,
            vs_inferred: site.vs_inferred,
            z1p0: site.z1p0,
            z2p5: site.z2p5,
        });
    }
    Ok(inputs)
}

/// Stage 2: evaluate every (GMM, IMT) instance on every input.
pub(crate) fn inputs_to_ground_motions(
    inputs: InputList,
    table: &GmmTable,
    config: &CalcConfig,
) -> RSHMResult<GroundMotions> {
    let gmms: Vec<_> = table.keys().copied().collect();
    let mut builder = GroundMotions::builder(inputs, &gmms, config.imts());
    for (&gmm, row) in table {
        for (&imt, model) in row {
            for index in 0..builder.inputs().len() {
                let motion = model.calc(builder.inputs().get(index));
                if !(motion.mean.is_finite() && motion.sigma.is_finite() && motion.sigma >= 0.0) {
                    return Err(RSHMError::NonFiniteGroundMotion {
                        gmm,
                        imt,
                        mean: motion.mean,
                        sigma: motion.sigma,
                    });
                }
                builder.add(gmm, imt, motion, index);
            }
        }
    }
    Ok(builder.build())
}

/// Stage 3: integrate exceedance over the model curves, scale by rate,
/// and sum across inputs per (IMT, GMM).
pub(crate) fn ground_motions_to_curves(
    ground_motions: GroundMotions,
    config: &CalcConfig,
) -> HazardCurves {
    let exceedance = config.exceedance_model();
    let truncation = config.truncation_level();

    let mut computed = Vec::new();
    for (&imt, template) in config.log_model_curves() {
        let mut util_curve = XySequence::copy_of(template);
        let means = ground_motions.means(imt);
        let sigmas = ground_motions.sigmas(imt);
        for (&gmm, gmm_means) in means {
            let gmm_sigmas = &sigmas[&gmm];
            let mut gmm_curve = XySequence::copy_of(template);
            for (index, (&mean, &sigma)) in gmm_means.iter().zip(gmm_sigmas).enumerate() {
                exceedance.fill(mean, sigma, truncation, imt, &mut util_curve);
                util_curve.multiply(ground_motions.inputs().get(index).rate);
                gmm_curve.add(&util_curve);
            }
            computed.push((imt, gmm, gmm_curve));
        }
    }

    let mut builder = HazardCurves::builder(ground_motions);
    for (imt, gmm, curve) in computed {
        builder.add_curve(imt, gmm, curve);
    }
    builder.build()
}

/// Stages 1-3 composed for one standard source.
pub(crate) fn source_to_curves(
    source: &Source,
    site: &Site,
    table: &GmmTable,
    config: &CalcConfig,
) -> RSHMResult<HazardCurves> {
    let inputs = source_to_inputs(source, site)?;
    let ground_motions = inputs_to_ground_motions(inputs, table, config)?;
    Ok(ground_motions_to_curves(ground_motions, config))
}

/// Cluster stage 1: expand every segment of a cluster.
pub(crate) fn cluster_to_inputs(cluster: &ClusterSource, site: &Site) -> RSHMResult<ClusterInputs> {
    let mut inputs = ClusterInputs::new(&cluster.name, cluster.rate);
    for segment in &cluster.segments {
        inputs.add(ruptures_to_inputs(&segment.name, &segment.ruptures, site)?);
    }
    Ok(inputs)
}

/// Cluster stage 2: ground motions per segment.
pub(crate) fn cluster_inputs_to_ground_motions(
    inputs: ClusterInputs,
    table: &GmmTable,
    config: &CalcConfig,
) -> RSHMResult<ClusterGroundMotions> {
    let mut motions = ClusterGroundMotions::new(&inputs);
    for segment in inputs.segments {
        motions.add(inputs_to_ground_motions(segment, table, config)?);
    }
    Ok(motions)
}

/// Cluster stage 3: per-segment exceedance combined as independent
/// events, then scaled by the cluster rate.
///
/// Magnitude-variant weights ride in the rate slot of the segment
/// ruptures, so each segment's summed curve is already its probability
/// of exceedance given the cluster event.
pub(crate) fn cluster_ground_motions_to_curves(
    ground_motions: ClusterGroundMotions,
    config: &CalcConfig,
) -> ClusterCurves {
    let exceedance = config.exceedance_model();
    let truncation = config.truncation_level();
    let rate = ground_motions.rate;
    let mut builder = ClusterCurves::builder(&ground_motions);

    for (&imt, template) in config.log_model_curves() {
        let mut util_curve = XySequence::copy_of(template);
        // per-gmm curves of each segment in the cluster
        let mut segment_curves: std::collections::BTreeMap<_, Vec<XySequence>> =
            std::collections::BTreeMap::new();

        for motions in &ground_motions.segments {
            let means = motions.means(imt);
            let sigmas = motions.sigmas(imt);
            for (&gmm, gmm_means) in means {
                let gmm_sigmas = &sigmas[&gmm];
                let mut variant_curve = XySequence::copy_of(template);
                for (index, (&mean, &sigma)) in gmm_means.iter().zip(gmm_sigmas).enumerate() {
                    exceedance.fill(mean, sigma, truncation, imt, &mut util_curve);
                    util_curve.multiply(motions.inputs().get(index).rate);
                    variant_curve.add(&util_curve);
                }
                segment_curves.entry(gmm).or_default().push(variant_curve);
            }
        }

        for (gmm, curves) in segment_curves {
            let mut combined = cluster_exceedance(&curves);
            combined.multiply(rate);
            builder.add_curve(imt, gmm, combined);
        }
    }
    builder.build()
}

/// Cluster stages 1-3 composed.
pub(crate) fn cluster_to_curves(
    cluster: &ClusterSource,
    site: &Site,
    table: &GmmTable,
    config: &CalcConfig,
) -> RSHMResult<ClusterCurves> {
    let inputs = cluster_to_inputs(cluster, site)?;
    let ground_motions = cluster_inputs_to_ground_motions(inputs, table, config)?;
    Ok(cluster_ground_motions_to_curves(ground_motions, config))
}

/// System stages 1-3: bulk input materialization behind the section
/// bitset filter, then the standard ground-motion and curve stages over
/// the single table-wide input list.
pub(crate) fn system_to_curves(
    system: &SystemSourceSet,
    site: &Site,
    table: &GmmTable,
    config: &CalcConfig,
) -> RSHMResult<HazardCurves> {
    let inputs = system.to_inputs(site, config.max_distance())?;
    let ground_motions = inputs_to_ground_motions(inputs, table, config)?;
    Ok(ground_motions_to_curves(ground_motions, config))
}
