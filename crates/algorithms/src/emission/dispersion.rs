//! Dispersion-model covariate
//!
//! Feeds emission records through an external source-receptor model and
//! sums the resulting total PM2.5 fields. The model owns its own receptor
//! grid, so the result is one value per grid cell rather than one per
//! query point.

use lurcov_core::{Algorithm, Error, Feature, Result};
use ndarray::Array1;
use tracing::debug;

use super::records::{to_emissions, EmissionParams, EmissionRecord};

/// Boxed error returned by a dispersion model
pub type ModelError = Box<dyn std::error::Error + Send + Sync>;

/// Concentrations produced by a single emission record, one value per
/// receptor cell for each particulate species.
#[derive(Debug, Clone, PartialEq)]
pub struct ConcentrationField {
    pub primary_pm25: Array1<f64>,
    pub pnh4: Array1<f64>,
    pub pno3: Array1<f64>,
    pub pso4: Array1<f64>,
    pub soa: Array1<f64>,
}

impl ConcentrationField {
    /// Field with every species zero on a grid of `len` cells
    pub fn zeros(len: usize) -> Self {
        Self {
            primary_pm25: Array1::zeros(len),
            pnh4: Array1::zeros(len),
            pno3: Array1::zeros(len),
            pso4: Array1::zeros(len),
            soa: Array1::zeros(len),
        }
    }

    pub fn len(&self) -> usize {
        self.primary_pm25.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primary_pm25.is_empty()
    }

    /// Total PM2.5: sum of all particulate species per cell
    pub fn total_pm25(&self) -> Array1<f64> {
        &self.primary_pm25 + &self.pnh4 + &self.pno3 + &self.pso4 + &self.soa
    }
}

/// A source-receptor dispersion model.
///
/// Implementations map one emission record to the concentrations it
/// causes on the model's receptor grid.
pub trait DispersionModel {
    /// Number of receptor cells
    fn grid_len(&self) -> usize;

    /// Concentrations caused by `record`
    fn concentrations(&self, record: &EmissionRecord) -> std::result::Result<ConcentrationField, ModelError>;
}

/// Sum the total PM2.5 fields of every emission record.
///
/// Records are applied in input order. Model failures abort the call and
/// are returned as `DispersionModel` errors.
pub fn sum_total_pm25<M: DispersionModel + ?Sized>(
    model: &M,
    records: &[EmissionRecord],
) -> Result<Array1<f64>> {
    let mut total: Array1<f64> = Array1::zeros(model.grid_len());
    for record in records {
        let field = model
            .concentrations(record)
            .map_err(Error::DispersionModel)?;
        if field.len() != total.len() {
            return Err(Error::SizeMismatch {
                expected: total.len(),
                actual: field.len(),
            });
        }
        total += &field.total_pm25();
    }
    Ok(total)
}

/// Dispersion covariate over `features`.
///
/// Returns `None` for a collection-dominated feature set.
pub fn dispersion_aggregate<M: DispersionModel + ?Sized>(
    model: &M,
    features: &[Feature],
    params: &EmissionParams,
) -> Result<Option<Array1<f64>>> {
    let kind = crate::vector::classify(features)?;
    if kind == lurcov_core::GeometryKind::Collection {
        debug!("collection-dominated feature set, no emissions");
        return Ok(None);
    }
    let records = to_emissions(features, params.pollutant)?;
    debug!(
        records = records.len(),
        pollutant = %params.pollutant,
        grid = model.grid_len(),
        "running dispersion model"
    );
    sum_total_pm25(model, &records).map(Some)
}

/// Dispersion-model algorithm bound to a model instance
pub struct DispersionCovariate<'a, M: ?Sized> {
    model: &'a M,
}

impl<'a, M: DispersionModel + ?Sized> DispersionCovariate<'a, M> {
    pub fn new(model: &'a M) -> Self {
        Self { model }
    }
}

impl<M: DispersionModel + ?Sized> Algorithm for DispersionCovariate<'_, M> {
    type Input = Vec<Feature>;
    type Output = Option<Array1<f64>>;
    type Params = EmissionParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Dispersion"
    }

    fn description(&self) -> &'static str {
        "Sum total PM2.5 from a dispersion model over emissions of 1, length or area per feature"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        dispersion_aggregate(self.model, &input, &params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emission::Pollutant;
    use approx::assert_relative_eq;
    use geo::{line_string, point, Geometry, GeometryCollection};
    use std::cell::Cell;

    /// Puts the record's emission into the matching species of cell 0 and
    /// half of it into cell 1.
    struct TwoCellModel {
        calls: Cell<usize>,
    }

    impl TwoCellModel {
        fn new() -> Self {
            Self { calls: Cell::new(0) }
        }
    }

    impl DispersionModel for TwoCellModel {
        fn grid_len(&self) -> usize {
            2
        }

        fn concentrations(&self, record: &EmissionRecord) -> std::result::Result<ConcentrationField, ModelError> {
            self.calls.set(self.calls.get() + 1);
            let mut field = ConcentrationField::zeros(2);
            let species = match record.pollutant {
                Pollutant::PrimaryPm25 => &mut field.primary_pm25,
                Pollutant::PNh4 => &mut field.pnh4,
                Pollutant::PNo3 => &mut field.pno3,
                Pollutant::PSo4 => &mut field.pso4,
                Pollutant::Soa => &mut field.soa,
            };
            species[0] = record.magnitude;
            species[1] = record.magnitude / 2.0;
            Ok(field)
        }
    }

    struct FailingModel;

    impl DispersionModel for FailingModel {
        fn grid_len(&self) -> usize {
            1
        }

        fn concentrations(&self, _record: &EmissionRecord) -> std::result::Result<ConcentrationField, ModelError> {
            Err("receptor grid not loaded".into())
        }
    }

    struct WrongGridModel;

    impl DispersionModel for WrongGridModel {
        fn grid_len(&self) -> usize {
            3
        }

        fn concentrations(&self, _record: &EmissionRecord) -> std::result::Result<ConcentrationField, ModelError> {
            Ok(ConcentrationField::zeros(2))
        }
    }

    #[test]
    fn test_total_pm25_sums_species() {
        let mut field = ConcentrationField::zeros(1);
        field.primary_pm25[0] = 1.0;
        field.pnh4[0] = 2.0;
        field.pno3[0] = 3.0;
        field.pso4[0] = 4.0;
        field.soa[0] = 5.0;
        assert_eq!(field.total_pm25()[0], 15.0);
    }

    #[test]
    fn test_points_sum_over_records() {
        let model = TwoCellModel::new();
        let features: Vec<Feature> = (0..3)
            .map(|i| Feature::new(point!(x: i as f64, y: 0.0)))
            .collect();
        let out = dispersion_aggregate(&model, &features, &EmissionParams::default())
            .unwrap()
            .unwrap();
        assert_eq!(model.calls.get(), 3);
        assert_relative_eq!(out[0], 3.0);
        assert_relative_eq!(out[1], 1.5);
    }

    #[test]
    fn test_lines_use_length() {
        let model = TwoCellModel::new();
        let features = vec![Feature::new(line_string![(x: 0.0, y: 0.0), (x: 3.0, y: 4.0)])];
        let params = EmissionParams {
            pollutant: Pollutant::PSo4,
        };
        let out = DispersionCovariate::new(&model)
            .execute(features, params)
            .unwrap()
            .unwrap();
        assert_relative_eq!(out[0], 5.0, epsilon = 1e-12);
    }

    #[test]
    fn test_collection_skips_model() {
        let model = TwoCellModel::new();
        let gc = Geometry::GeometryCollection(GeometryCollection::new_from(vec![]));
        let out = dispersion_aggregate(&model, &[Feature::new(gc)], &EmissionParams::default()).unwrap();
        assert!(out.is_none());
        assert_eq!(model.calls.get(), 0);
    }

    #[test]
    fn test_model_failure_is_surfaced() {
        let features = vec![Feature::new(point!(x: 0.0, y: 0.0))];
        let err = dispersion_aggregate(&FailingModel, &features, &EmissionParams::default()).unwrap_err();
        assert!(matches!(err, Error::DispersionModel(_)));
        assert!(err.to_string().contains("receptor grid not loaded"));
    }

    #[test]
    fn test_grid_mismatch() {
        let features = vec![Feature::new(point!(x: 0.0, y: 0.0))];
        let err = dispersion_aggregate(&WrongGridModel, &features, &EmissionParams::default()).unwrap_err();
        assert!(matches!(err, Error::SizeMismatch { expected: 3, actual: 2 }));
    }

    #[test]
    fn test_no_records_gives_zero_field() {
        let model = TwoCellModel::new();
        let out = sum_total_pm25(&model, &[]).unwrap();
        assert_eq!(out.to_vec(), vec![0.0, 0.0]);
    }
}
