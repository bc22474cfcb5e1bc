//! Pre-built Test Fixtures
//!
//! Provides ready-to-use test data for the CRM's tenants, client companies
//! and financial statements. Fixed values are predictable; the `fake_*`
//! helpers give variety where the exact value does not matter.

use fake::faker::company::en::{CompanyName, Industry};
use fake::faker::lorem::en::Sentence;
use fake::Fake;
use once_cell::sync::Lazy;
use serde_json::{json, Value};

use core_kernel::{TenantId, UserId};
use domain_actions::ActionContext;

/// Tenant shared by tests that need a stable id across calls
pub static TEST_TENANT: Lazy<TenantId> = Lazy::new(TenantId::new);

/// Fixture for identifiers
pub struct IdFixtures;

impl IdFixtures {
    /// The shared test tenant
    pub fn tenant_id() -> TenantId {
        *TEST_TENANT
    }

    /// Creates a new user ID
    pub fn user_id() -> UserId {
        UserId::new()
    }

    /// Caller context for the shared tenant
    pub fn context() -> ActionContext {
        ActionContext::new(Self::tenant_id(), Self::user_id())
    }
}

/// Fixture for client company data
pub struct CompanyFixtures;

impl CompanyFixtures {
    pub const ACME_NAME: &'static str = "Acme Industrial SA";

    /// A fixed client company as the frontend sends it
    pub fn acme() -> Value {
        json!({
            "name": Self::ACME_NAME,
            "industry": "Manufacturing",
            "employees": 420,
            "annualRevenue": 18500000
        })
    }

    /// A company with a random name and industry
    pub fn fake_company() -> Value {
        let name: String = CompanyName().fake();
        let industry: String = Industry().fake();
        json!({
            "name": name,
            "industry": industry,
            "employees": (10u32..5000).fake::<u32>()
        })
    }

    /// Free-text visit notes
    pub fn fake_visit_notes() -> String {
        Sentence(8..16).fake()
    }
}

/// Fixture for financial statements
pub struct StatementFixtures;

impl StatementFixtures {
    /// A complete, healthy period
    ///
    /// Ratios: current 2.0, debt-to-equity 1.5, net margin 0.085,
    /// return on assets 0.034.
    pub fn healthy_period() -> Value {
        json!({
            "period": "2023",
            "revenue": "1000000",
            "net_income": "85000",
            "total_assets": "2500000",
            "total_liabilities": "1500000",
            "current_assets": "600000",
            "current_liabilities": "300000",
            "equity": "1000000"
        })
    }

    /// A period with zero equity and no current figures
    pub fn distressed_period() -> Value {
        json!({
            "period": "2022",
            "revenue": "400000",
            "net_income": "-120000",
            "total_assets": "900000",
            "total_liabilities": "900000",
            "equity": "0"
        })
    }

    /// Both periods as a `statements` array
    pub fn statements() -> Value {
        json!([Self::healthy_period(), Self::distressed_period()])
    }
}
