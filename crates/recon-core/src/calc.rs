//! Tax and rounding calculator.
//!
//! Pure functions: given the same items, configuration and fees they
//! return the same integer every time. The fee-edit recomputation path
//! relies on this.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::debug;

use crate::models::config::{CalculationType, RoundingMode, SupplierConfig, TaxType};
use crate::models::item::LineItem;
use crate::models::run::FeeOverrides;

/// A fee after default resolution: always has an amount and a tax type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedFee {
    pub amount: Decimal,
    pub tax_type: TaxType,
}

impl ResolvedFee {
    pub fn zero() -> Self {
        Self {
            amount: Decimal::ZERO,
            tax_type: TaxType::Included,
        }
    }
}

/// Effective participation and shipping fees for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedFees {
    pub participation: ResolvedFee,
    pub shipping: ResolvedFee,
}

/// Resolve the effective fees for a run.
///
/// Precedence: run-level override, then supplier configuration, then zero
/// with tax type `included`. This is the single defaulting point shared by
/// the initial import and the fee-edit recomputation, so the two paths
/// cannot diverge.
pub fn resolve_fees(config: &SupplierConfig, overrides: &FeeOverrides) -> ResolvedFees {
    let participation = resolve_one(
        overrides.participation_fee,
        overrides.participation_fee_tax_type,
        config.participation_fee.map(|f| (f.amount, f.tax_type)),
    );
    let shipping = resolve_one(
        overrides.shipping_fee,
        overrides.shipping_fee_tax_type,
        config.shipping_fee.map(|f| (f.amount, f.tax_type)),
    );
    ResolvedFees {
        participation,
        shipping,
    }
}

fn resolve_one(
    override_amount: Option<Decimal>,
    override_tax_type: Option<TaxType>,
    configured: Option<(Decimal, TaxType)>,
) -> ResolvedFee {
    match (override_amount, configured) {
        (Some(amount), configured) => ResolvedFee {
            amount,
            tax_type: override_tax_type
                .or(configured.map(|(_, t)| t))
                .unwrap_or_default(),
        },
        (None, Some((amount, tax_type))) => ResolvedFee { amount, tax_type },
        (None, None) => ResolvedFee::zero(),
    }
}

/// Round a decimal to a whole currency unit.
///
/// `Round` is half-up, away from zero at .5.
pub fn apply_rounding(value: Decimal, mode: RoundingMode) -> i64 {
    let rounded = match mode {
        RoundingMode::Floor => value.floor(),
        RoundingMode::Ceil => value.ceil(),
        RoundingMode::Round => {
            value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        }
    };
    rounded.to_i64().unwrap_or_default()
}

/// Convert an amount to its tax-included form without rounding.
fn with_tax(amount: Decimal, tax_type: TaxType, rate: Decimal) -> Decimal {
    match tax_type {
        TaxType::Included => amount,
        TaxType::Excluded => amount * (Decimal::ONE + rate),
    }
}

/// Convert a component to tax-included form, rounding the conversion when
/// tax had to be added. Already-included amounts pass through unrounded.
fn rounded_component(amount: Decimal, tax_type: TaxType, rate: Decimal, mode: RoundingMode) -> Decimal {
    match tax_type {
        TaxType::Included => amount,
        TaxType::Excluded => Decimal::from(apply_rounding(amount * (Decimal::ONE + rate), mode)),
    }
}

/// Compute the authoritative system total for a set of line items.
///
/// The calculation order mirrors where the supplier rounds in its own
/// arithmetic; a one-size-fits-all policy would flag correct invoices as
/// mismatches.
pub fn calculate_total(items: &[LineItem], config: &SupplierConfig, fees: &ResolvedFees) -> i64 {
    let rate = config.tax_rate;
    let mode = config.rounding.rounding_mode;
    let price_tax = config.product_price_tax_type;
    let commission_tax = config.commission_tax_type;

    let total = match config.rounding.calculation_type {
        CalculationType::PerItem => {
            let mut sum = Decimal::ZERO;
            for item in items {
                let qty = Decimal::from(item.quantity);
                sum += rounded_component(item.purchase_price * qty, price_tax, rate, mode);
                sum += rounded_component(item.commission * qty, commission_tax, rate, mode);
            }
            sum += rounded_component(fees.participation.amount, fees.participation.tax_type, rate, mode);
            sum += rounded_component(fees.shipping.amount, fees.shipping.tax_type, rate, mode);
            apply_rounding(sum, mode)
        }
        CalculationType::Subtotal => {
            let (price_sub, commission_sub) = raw_subtotals(items);
            let sum = rounded_component(price_sub, price_tax, rate, mode)
                + rounded_component(commission_sub, commission_tax, rate, mode)
                + rounded_component(fees.participation.amount, fees.participation.tax_type, rate, mode)
                + rounded_component(fees.shipping.amount, fees.shipping.tax_type, rate, mode);
            apply_rounding(sum, mode)
        }
        CalculationType::Total => {
            let (price_sub, commission_sub) = raw_subtotals(items);
            let sum = with_tax(price_sub, price_tax, rate)
                + with_tax(commission_sub, commission_tax, rate)
                + with_tax(fees.participation.amount, fees.participation.tax_type, rate)
                + with_tax(fees.shipping.amount, fees.shipping.tax_type, rate);
            apply_rounding(sum, mode)
        }
    };

    debug!(
        items = items.len(),
        ?config.rounding,
        total,
        "calculated system total"
    );
    total
}

fn raw_subtotals(items: &[LineItem]) -> (Decimal, Decimal) {
    let mut price_sub = Decimal::ZERO;
    let mut commission_sub = Decimal::ZERO;
    for item in items {
        let qty = Decimal::from(item.quantity);
        price_sub += item.purchase_price * qty;
        commission_sub += item.commission * qty;
    }
    (price_sub, commission_sub)
}
