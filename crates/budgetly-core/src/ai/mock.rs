//! Mock backend for testing
//!
//! Returns predictable responses derived from the snapshot so tests can
//! assert on them without a running chat server.

use async_trait::async_trait;

use super::parsing::parse_tips;
use super::AdvisorBackend;
use crate::error::{Error, Result};
use crate::models::FinancialSnapshot;

/// Mock advisor backend
#[derive(Clone, Default)]
pub struct MockBackend {
    /// Whether health_check should return true
    pub healthy: bool,
    /// Whether every request should fail
    pub failing: bool,
}

impl MockBackend {
    /// Create a new mock backend (healthy by default)
    pub fn new() -> Self {
        Self {
            healthy: true,
            failing: false,
        }
    }

    /// Create a backend whose requests all fail
    pub fn failing() -> Self {
        Self {
            healthy: false,
            failing: true,
        }
    }

    fn check(&self) -> Result<()> {
        if self.failing {
            return Err(Error::Ai("mock backend configured to fail".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl AdvisorBackend for MockBackend {
    async fn financial_insights(
        &self,
        snapshot: &FinancialSnapshot,
        question: Option<&str>,
    ) -> Result<String> {
        self.check()?;

        if snapshot.is_empty() {
            return Ok("Welcome! Create your first budget to get personalized insights.".into());
        }

        let summary = &snapshot.summary;
        let mut answer = format!(
            "You have used {:.1}% of your ${:.2} total budget, leaving ${:.2}.",
            summary.budget_utilization_percentage, summary.total_budget, summary.remaining_budget
        );
        if let Some(question) = question.filter(|q| !q.trim().is_empty()) {
            answer.push_str(&format!(" Regarding \"{}\": keep spending below your budgets.", question.trim()));
        }
        Ok(answer)
    }

    async fn quick_tips(&self, snapshot: &FinancialSnapshot) -> Result<Vec<String>> {
        self.check()?;

        let mut response = String::from("• Track your spending daily\n");
        if let Some(top) = snapshot.category_spending.first() {
            response.push_str(&format!("• Watch your {} spending\n", top.category));
        }
        response.push_str("• Review budgets monthly\n");
        Ok(parse_tips(&response))
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }

    fn model(&self) -> &str {
        "mock"
    }

    fn host(&self) -> &str {
        "mock://localhost"
    }
}
