//! Reporting DTOs

use rust_decimal::Decimal;
use serde::Serialize;

/// Manager financial summary across all branches
#[derive(Debug, Serialize)]
pub struct FinancialSummaryResponse {
    /// Outstanding balances across active reservations
    pub total_outstanding: Decimal,
    /// Sum of pending billing charges
    pub pending_charges: Decimal,
    /// Sum of settled billing charges
    pub paid_charges: Decimal,
    /// Sum of overdue billing charges
    pub overdue_charges: Decimal,
    /// Completed reservation-fee payments
    pub fees_collected: Decimal,
    pub pending_reservations: i64,
    pub confirmed_reservations: i64,
    pub cancelled_reservations: i64,
}
