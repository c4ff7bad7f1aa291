//! Book instance (physical copy) model and loan status

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::ToSchema;
use uuid::Uuid;

/// Availability of a single copy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum LoanStatus {
    #[default]
    Maintenance,
    OnLoan,
    Available,
    Reserved,
}

impl LoanStatus {
    pub const ALL: [LoanStatus; 4] = [
        LoanStatus::Maintenance,
        LoanStatus::OnLoan,
        LoanStatus::Available,
        LoanStatus::Reserved,
    ];

    /// Single-character code stored in the database
    pub fn code(&self) -> &'static str {
        match self {
            LoanStatus::Maintenance => "m",
            LoanStatus::OnLoan => "o",
            LoanStatus::Available => "a",
            LoanStatus::Reserved => "r",
        }
    }
}

impl std::fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            LoanStatus::Maintenance => "Maintenance",
            LoanStatus::OnLoan => "On loan",
            LoanStatus::Available => "Available",
            LoanStatus::Reserved => "Reserved",
        };
        f.write_str(label)
    }
}

impl std::str::FromStr for LoanStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "m" => Ok(LoanStatus::Maintenance),
            "o" => Ok(LoanStatus::OnLoan),
            "a" => Ok(LoanStatus::Available),
            "r" => Ok(LoanStatus::Reserved),
            _ => Err(format!("Invalid loan status code: {}", s)),
        }
    }
}

// SQLx conversion for LoanStatus (stored as its one-letter code)
impl sqlx::Type<Postgres> for LoanStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for LoanStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for LoanStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        <&str as Encode<Postgres>>::encode(self.code(), buf)
    }
}

/// A borrowable copy of a book
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookInstance {
    pub id: Uuid,
    pub book_id: i32,
    pub imprint: String,
    pub due_back: Option<NaiveDate>,
    pub status: LoanStatus,
    /// Set while the copy is on loan
    pub borrower_id: Option<i32>,
}

/// A copy currently on loan, as shown in loan listings
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct LoanedInstance {
    pub id: Uuid,
    pub book_id: i32,
    pub book_title: String,
    pub imprint: String,
    pub due_back: Option<NaiveDate>,
    pub status: LoanStatus,
    pub borrower_id: Option<i32>,
    #[sqlx(skip)]
    #[serde(default)]
    pub is_overdue: bool,
}

impl LoanedInstance {
    /// Past its due date as of `today`; undated loans are never overdue
    pub fn is_overdue_on(&self, today: NaiveDate) -> bool {
        self.due_back.map_or(false, |d| today > d)
    }
}

/// Renewal form: a single required date field
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct RenewalForm {
    /// Proposed new due date (YYYY-MM-DD)
    #[serde(default)]
    pub renewal_date: Option<NaiveDate>,
}

/// Renewal form as presented before submission
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RenewalFormView {
    pub instance: BookInstance,
    pub form: RenewalForm,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_parse_back() {
        for status in LoanStatus::ALL {
            assert_eq!(status.code().parse::<LoanStatus>().unwrap(), status);
        }
        assert!("x".parse::<LoanStatus>().is_err());
        assert!("O".parse::<LoanStatus>().is_err());
    }

    #[test]
    fn new_copies_start_in_maintenance() {
        assert_eq!(LoanStatus::default(), LoanStatus::Maintenance);
    }

    #[test]
    fn overdue_only_after_due_date() {
        let due = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let loan = LoanedInstance {
            id: Uuid::new_v4(),
            book_id: 1,
            book_title: "Dune".to_string(),
            imprint: "Penguin, 1999".to_string(),
            due_back: Some(due),
            status: LoanStatus::OnLoan,
            borrower_id: Some(4),
            is_overdue: false,
        };
        assert!(!loan.is_overdue_on(due));
        assert!(loan.is_overdue_on(due.succ_opt().unwrap()));

        let undated = LoanedInstance { due_back: None, ..loan };
        assert!(!undated.is_overdue_on(due));
    }
}
