//! Tax-year lookup tables
//!
//! Year-specific amounts are an explicit configuration object passed into
//! `FieldMapper`, not module-level state, so tests (and a future tax-year
//! switch) can substitute alternate tables without global side effects.

use crate::model::FilingStatus;
use crate::money::Amount;
use serde::{Deserialize, Serialize};

/// Standard-deduction table for one tax year.
///
/// `additional_*` is the per-box increment for the age-65/blindness
/// checkboxes; the married rate also covers qualifying surviving spouse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxYearTables {
    pub year: u16,
    pub single: Amount,
    pub married_filing_jointly: Amount,
    pub married_filing_separately: Amount,
    pub head_of_household: Amount,
    pub qualifying_surviving_spouse: Amount,
    pub additional_unmarried: Amount,
    pub additional_married: Amount,
}

impl TaxYearTables {
    /// Tax year 2024 amounts (Rev. Proc. 2023-34)
    pub fn year_2024() -> Self {
        Self {
            year: 2024,
            single: Amount::from_dollars(14_600),
            married_filing_jointly: Amount::from_dollars(29_200),
            married_filing_separately: Amount::from_dollars(14_600),
            head_of_household: Amount::from_dollars(21_900),
            qualifying_surviving_spouse: Amount::from_dollars(29_200),
            additional_unmarried: Amount::from_dollars(1_950),
            additional_married: Amount::from_dollars(1_550),
        }
    }

    /// Base standard deduction for a filing status
    pub fn base(&self, status: FilingStatus) -> Amount {
        match status {
            FilingStatus::Single => self.single,
            FilingStatus::MarriedFilingJointly => self.married_filing_jointly,
            FilingStatus::MarriedFilingSeparately => self.married_filing_separately,
            FilingStatus::HeadOfHousehold => self.head_of_household,
            FilingStatus::QualifyingSurvivingSpouse => self.qualifying_surviving_spouse,
        }
    }

    /// Per-box increment for age-65/blindness checkboxes
    pub fn additional(&self, status: FilingStatus) -> Amount {
        match status {
            FilingStatus::Single | FilingStatus::HeadOfHousehold => self.additional_unmarried,
            _ => self.additional_married,
        }
    }

    /// Standard deduction for `status` with `boxes_checked` of the
    /// age-65/blindness boxes ticked (0..=4).
    pub fn standard_deduction(&self, status: FilingStatus, boxes_checked: u32) -> Amount {
        let mut amount = self.base(status);
        for _ in 0..boxes_checked {
            amount += self.additional(status);
        }
        amount
    }
}

impl Default for TaxYearTables {
    fn default() -> Self {
        Self::year_2024()
    }
}
