mod currency;
mod ratios;
mod records;
mod results;

pub use currency::Currency;
pub use ratios::{Cer, Classification, IcerResult, IcerValue};
pub use records::{OutcomeCategory, PatientEconomicRecord};
pub use results::{
    CohortResult, CohortSummary, CostBreakdown, PatientResult, QalyResult, RealizedComplication,
};
