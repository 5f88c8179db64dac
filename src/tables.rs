use comfy_table::{Attribute, Cell, CellAlignment, Color, Table, modifiers, presets};

use crate::{
    core::{
        bill::BillingResult,
        period::TariffPeriod,
        pricing::{DistributionDemand, PricingConfig},
    },
    error::Diagnostic,
};

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .apply_modifier(modifiers::UTF8_ROUND_CORNERS)
        .enforce_styling();
    table
}

const fn period_color(period: TariffPeriod) -> Color {
    match period {
        TariffPeriod::Base => Color::Green,
        TariffPeriod::Intermedio => Color::DarkYellow,
        TariffPeriod::Punta => Color::Red,
    }
}

pub fn build_periods_table(result: &BillingResult, prices: &PricingConfig) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Periodo", "Energía", "Demanda máxima", "Precio", "Costo"]);
    let rows = [
        (
            TariffPeriod::Base,
            result.kwh_base,
            result.max_base,
            prices.precio_base,
            result.costo_base,
        ),
        (
            TariffPeriod::Intermedio,
            result.kwh_intermedio,
            result.max_intermedio,
            prices.precio_intermedio,
            result.costo_intermedio,
        ),
        (
            TariffPeriod::Punta,
            result.kwh_punta,
            result.max_punta,
            prices.precio_punta,
            result.costo_punta,
        ),
    ];
    for (period, energy, peak, price, cost) in rows {
        table.add_row(vec![
            Cell::new(period).fg(period_color(period)),
            Cell::new(energy).set_alignment(CellAlignment::Right),
            Cell::new(peak).set_alignment(CellAlignment::Right),
            Cell::new(price).set_alignment(CellAlignment::Right).add_attribute(Attribute::Dim),
            Cell::new(cost).set_alignment(CellAlignment::Right),
        ]);
    }
    table.add_row(vec![
        Cell::new("Total").add_attribute(Attribute::Bold),
        Cell::new(result.total_kwh()).set_alignment(CellAlignment::Right),
        Cell::new(result.demanda_facturable)
            .set_alignment(CellAlignment::Right)
            .add_attribute(Attribute::Bold),
        Cell::new(format!("{:.2} días", result.dias_periodo)).add_attribute(Attribute::Dim),
        Cell::new(result.costo_base + result.costo_intermedio + result.costo_punta)
            .set_alignment(CellAlignment::Right),
    ]);
    table
}

pub fn build_bill_table(result: &BillingResult, prices: &PricingConfig) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Concepto", "Detalle", "Importe"]);

    let energy = result.costo_base + result.costo_intermedio + result.costo_punta;
    let mut rows = vec![
        ("Energía", result.total_kwh().to_string(), energy),
        (
            "Capacidad",
            format!("{} × {}", result.demanda_facturable, prices.precio_capacidad),
            result.costo_capacidad,
        ),
        (
            "Distribución",
            format!("{} × {}", result.demanda_distribucion, prices.precio_distribucion),
            result.costo_distribucion,
        ),
        ("Cargo fijo", String::new(), result.cargo_fijo),
    ];
    if prices.incluir_dap {
        let detail = format!("{} × {}", prices.porcentaje_dap, result.subtotal_sin_dap);
        rows.push(("DAP", detail, result.dap));
    }
    rows.push(("Subtotal", String::new(), result.subtotal));
    rows.push(("IVA", format!("{} × {}", prices.iva_rate, result.subtotal), result.iva));
    for (concept, detail, amount) in rows {
        table.add_row(vec![
            Cell::new(concept),
            Cell::new(detail).add_attribute(Attribute::Dim),
            Cell::new(amount).set_alignment(CellAlignment::Right),
        ]);
    }
    table.add_row(vec![
        Cell::new("Total").add_attribute(Attribute::Bold),
        Cell::new(""),
        Cell::new(result.total)
            .set_alignment(CellAlignment::Right)
            .add_attribute(Attribute::Bold)
            .fg(Color::Cyan),
    ]);
    table
}

pub fn build_prices_table(prices: &PricingConfig) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Precio", "Valor"]);
    let distribution = match prices.demanda_distribucion {
        DistributionDemand::Billable => "demanda facturable".to_owned(),
        DistributionDemand::LoadFactor { factor } => format!("factor de carga {factor}"),
    };
    let rows = [
        ("precioBase", prices.precio_base.to_string()),
        ("precioIntermedio", prices.precio_intermedio.to_string()),
        ("precioPunta", prices.precio_punta.to_string()),
        ("precioCapacidad", prices.precio_capacidad.to_string()),
        ("precioDistribucion", prices.precio_distribucion.to_string()),
        ("cargoFijo", prices.cargo_fijo.to_string()),
        ("incluirDap", prices.incluir_dap.to_string()),
        ("porcentajeDap", prices.porcentaje_dap.to_string()),
        ("ivaRate", prices.iva_rate.to_string()),
        ("demandaDistribucion", distribution),
    ];
    for (name, value) in rows {
        table.add_row(vec![Cell::new(name), Cell::new(value).set_alignment(CellAlignment::Right)]);
    }
    table
}

pub fn build_diagnostics_table(diagnostics: &[Diagnostic]) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Diagnóstico"]);
    for diagnostic in diagnostics {
        table.add_row(vec![Cell::new(diagnostic).fg(Color::DarkYellow)]);
    }
    table
}
