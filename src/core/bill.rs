use serde::Serialize;

use crate::quantity::{cost::Cost, energy::KilowattHours, power::Kilowatts};

/// Itemized bill, in full precision unless [`BillingResult::rounded`] is called.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
#[must_use]
pub struct BillingResult {
    pub kwh_base: KilowattHours,
    pub kwh_intermedio: KilowattHours,
    pub kwh_punta: KilowattHours,

    pub max_base: Kilowatts,
    pub max_intermedio: Kilowatts,
    pub max_punta: Kilowatts,

    pub demanda_facturable: Kilowatts,

    /// Demand the distribution charge is priced on.
    pub demanda_distribucion: Kilowatts,

    pub dias_periodo: f64,

    pub costo_base: Cost,
    pub costo_intermedio: Cost,
    pub costo_punta: Cost,
    pub costo_capacidad: Cost,
    pub costo_distribucion: Cost,

    /// Energy, capacity, and distribution charges.
    pub energia: Cost,

    pub cargo_fijo: Cost,
    pub subtotal_sin_dap: Cost,

    /// «Derecho de alumbrado público», the municipal street-lighting levy.
    pub dap: Cost,

    pub subtotal: Cost,
    pub iva: Cost,
    pub total: Cost,
}

impl BillingResult {
    #[must_use]
    pub fn total_kwh(&self) -> KilowattHours {
        self.kwh_base + self.kwh_intermedio + self.kwh_punta
    }

    /// Presentation copy with every figure rounded to two decimals.
    pub fn rounded(&self) -> Self {
        Self {
            kwh_base: self.kwh_base.round_to(2),
            kwh_intermedio: self.kwh_intermedio.round_to(2),
            kwh_punta: self.kwh_punta.round_to(2),
            max_base: self.max_base.round_to(2),
            max_intermedio: self.max_intermedio.round_to(2),
            max_punta: self.max_punta.round_to(2),
            demanda_facturable: self.demanda_facturable.round_to(2),
            demanda_distribucion: self.demanda_distribucion.round_to(2),
            dias_periodo: (self.dias_periodo * 100.0).round() / 100.0,
            costo_base: self.costo_base.round_to_cents(),
            costo_intermedio: self.costo_intermedio.round_to_cents(),
            costo_punta: self.costo_punta.round_to_cents(),
            costo_capacidad: self.costo_capacidad.round_to_cents(),
            costo_distribucion: self.costo_distribucion.round_to_cents(),
            energia: self.energia.round_to_cents(),
            cargo_fijo: self.cargo_fijo.round_to_cents(),
            subtotal_sin_dap: self.subtotal_sin_dap.round_to_cents(),
            dap: self.dap.round_to_cents(),
            subtotal: self.subtotal.round_to_cents(),
            iva: self.iva.round_to_cents(),
            total: self.total.round_to_cents(),
        }
    }
}
