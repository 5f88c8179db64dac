use serde::{Deserialize, Serialize};

use crate::{
    core::{aggregate::Aggregation, bill::BillingResult},
    error::BillingError,
    quantity::{
        cost::Cost,
        energy::KilowattHours,
        percent::Percent,
        power::Kilowatts,
        rate::{KilowattHourRate, KilowattRate},
    },
};

/// CFE's reference load factor.
pub const CFE_LOAD_FACTOR: f64 = 0.57;

/// Value-added tax, not configurable.
pub const IVA: Percent = Percent(16.0);

/// Which demand the distribution charge is priced on.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "camelCase")]
pub enum DistributionDemand {
    /// Same as the billable demand.
    #[default]
    Billable,

    /// `min(maxPunta, totalKwh / (24 × días × factor))`.
    LoadFactor { factor: f64 },
}

impl DistributionDemand {
    #[must_use]
    pub const fn cfe_load_factor() -> Self {
        Self::LoadFactor { factor: CFE_LOAD_FACTOR }
    }

    #[must_use]
    pub fn of(self, aggregation: &Aggregation) -> Kilowatts {
        match self {
            Self::Billable => aggregation.billable_demand(),
            Self::LoadFactor { factor } => {
                let average = aggregation.total_energy() / aggregation.span.duration();
                aggregation.peak_demand.punta.min(average / factor)
            }
        }
    }
}

/// Tariff prices for one computation.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PricingConfig {
    pub precio_base: KilowattHourRate,
    pub precio_intermedio: KilowattHourRate,
    pub precio_punta: KilowattHourRate,
    pub precio_capacidad: KilowattRate,
    pub precio_distribucion: KilowattRate,
    pub cargo_fijo: Cost,
    pub incluir_dap: bool,
    pub porcentaje_dap: Percent,

    #[serde(skip_deserializing)]
    pub iva_rate: Percent,

    pub demanda_distribucion: DistributionDemand,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            precio_base: KilowattHourRate::from(1.20),
            precio_intermedio: KilowattHourRate::from(1.98),
            precio_punta: KilowattHourRate::from(2.32),
            precio_capacidad: KilowattRate::from(367.15),
            precio_distribucion: KilowattRate::from(100.00),
            cargo_fijo: Cost::from(563.57),
            incluir_dap: false,
            porcentaje_dap: Percent(2.0),
            iva_rate: IVA,
            demanda_distribucion: DistributionDemand::Billable,
        }
    }
}

/// Optional replacement for every configurable price.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PriceOverrides {
    pub precio_base: Option<KilowattHourRate>,
    pub precio_intermedio: Option<KilowattHourRate>,
    pub precio_punta: Option<KilowattHourRate>,
    pub precio_capacidad: Option<KilowattRate>,
    pub precio_distribucion: Option<KilowattRate>,
    pub cargo_fijo: Option<Cost>,
    pub incluir_dap: Option<bool>,
    pub porcentaje_dap: Option<Percent>,
    pub demanda_distribucion: Option<DistributionDemand>,
}

impl PricingConfig {
    #[must_use]
    pub fn overridden_by(&self, overrides: &PriceOverrides) -> Self {
        Self {
            precio_base: overrides.precio_base.unwrap_or(self.precio_base),
            precio_intermedio: overrides.precio_intermedio.unwrap_or(self.precio_intermedio),
            precio_punta: overrides.precio_punta.unwrap_or(self.precio_punta),
            precio_capacidad: overrides.precio_capacidad.unwrap_or(self.precio_capacidad),
            precio_distribucion: overrides.precio_distribucion.unwrap_or(self.precio_distribucion),
            cargo_fijo: overrides.cargo_fijo.unwrap_or(self.cargo_fijo),
            incluir_dap: overrides.incluir_dap.unwrap_or(self.incluir_dap),
            porcentaje_dap: overrides.porcentaje_dap.unwrap_or(self.porcentaje_dap),
            iva_rate: self.iva_rate,
            demanda_distribucion: overrides
                .demanda_distribucion
                .unwrap_or(self.demanda_distribucion),
        }
    }

    /// Every price and percentage must be finite and non-negative.
    pub fn validate(&self) -> Result<(), BillingError> {
        let values = [
            ("precioBase", self.precio_base.0),
            ("precioIntermedio", self.precio_intermedio.0),
            ("precioPunta", self.precio_punta.0),
            ("precioCapacidad", self.precio_capacidad.0),
            ("precioDistribucion", self.precio_distribucion.0),
            ("cargoFijo", self.cargo_fijo.0),
            ("porcentajeDap", self.porcentaje_dap.0),
            ("ivaRate", self.iva_rate.0),
        ];
        for (field, value) in values {
            if !value.is_finite() || value < 0.0 {
                return Err(BillingError::InvalidPriceConfig { field, value });
            }
        }
        if let DistributionDemand::LoadFactor { factor } = self.demanda_distribucion
            && !(factor.is_finite() && factor > 0.0)
        {
            return Err(BillingError::InvalidPriceConfig {
                field: "demandaDistribucion.factor",
                value: factor,
            });
        }
        Ok(())
    }
}

/// Turn the aggregated energy and demand into an itemized bill.
///
/// Net export is not credited: each period's energy and demand are billed from zero up.
pub fn price(aggregation: &Aggregation, config: &PricingConfig) -> BillingResult {
    let energy = aggregation.energy.map(|energy| energy.max(KilowattHours::ZERO));
    let peaks = aggregation.peak_demand.map(|demand| demand.max(Kilowatts::ZERO));
    let demanda_facturable = peaks.billable();
    let demanda_distribucion =
        config.demanda_distribucion.of(aggregation).max(Kilowatts::ZERO);

    let costo_base = energy.base * config.precio_base;
    let costo_intermedio = energy.intermedio * config.precio_intermedio;
    let costo_punta = energy.punta * config.precio_punta;
    let costo_capacidad = demanda_facturable * config.precio_capacidad;
    let costo_distribucion = demanda_distribucion * config.precio_distribucion;

    let energia =
        costo_base + costo_intermedio + costo_punta + costo_capacidad + costo_distribucion;
    let subtotal_sin_dap = energia + config.cargo_fijo;
    let dap = if config.incluir_dap {
        subtotal_sin_dap.percent(config.porcentaje_dap)
    } else {
        Cost::ZERO
    };
    let subtotal = subtotal_sin_dap + dap;
    let iva = subtotal.percent(config.iva_rate);

    BillingResult {
        kwh_base: energy.base,
        kwh_intermedio: energy.intermedio,
        kwh_punta: energy.punta,
        max_base: peaks.base,
        max_intermedio: peaks.intermedio,
        max_punta: peaks.punta,
        demanda_facturable,
        demanda_distribucion,
        dias_periodo: aggregation.days(),
        costo_base,
        costo_intermedio,
        costo_punta,
        costo_capacidad,
        costo_distribucion,
        energia,
        cargo_fijo: config.cargo_fijo,
        subtotal_sin_dap,
        dap,
        subtotal,
        iva,
        total: subtotal + iva,
    }
}
