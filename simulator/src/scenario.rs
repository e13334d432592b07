//! Simulation scenarios.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// A scripted swap-form session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name.
    pub name: String,
    /// Description.
    #[serde(default)]
    pub description: String,
    /// Steps in the scenario.
    pub steps: Vec<ScenarioStep>,
}

/// A user action or check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScenarioStep {
    /// Pick (or clear) the currency to sell.
    SelectSell { symbol: Option<String> },
    /// Pick (or clear) the currency to buy.
    SelectBuy { symbol: Option<String> },
    /// Type into the sell field, one keystroke at a time.
    Type { text: String },
    /// Clear the sell field.
    ClearAmount,
    /// Wait for a duration.
    Wait { millis: u64 },
    /// Press the swap-direction trigger.
    SwapPair,
    /// Press the submit trigger.
    Submit,
    /// Assert a condition.
    Assert { condition: AssertCondition },
}

/// Swap state as named in scenario files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExpectedState {
    Idle,
    Submitting,
    Succeeded,
    Failed,
}

/// Conditions that can be asserted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AssertCondition {
    /// The sell field holds exactly this text.
    SellAmountEquals { amount: String },
    /// The buy field holds exactly this text.
    BuyAmountEquals { amount: String },
    /// The buy field is filled in.
    BuyAmountPresent,
    /// The swap is in this state.
    StateIs { state: ExpectedState },
    /// The status banner shows this text (or nothing).
    BannerEquals { text: Option<String> },
    /// The submit trigger is enabled or disabled.
    CanSubmit { expected: bool },
}

impl Scenario {
    /// Load a built-in scenario by name, or a scenario file by path.
    pub fn load(name: &str) -> anyhow::Result<Self> {
        match name {
            "quote-and-submit" => Ok(Self::quote_and_submit()),
            "pair-swap" => Ok(Self::pair_swap()),
            "validation" => Ok(Self::validation()),
            path if Path::new(path).exists() => {
                let document = std::fs::read_to_string(path)?;
                Ok(serde_json::from_str(&document)?)
            }
            _ => Err(anyhow::anyhow!("Unknown scenario: {}", name)),
        }
    }

    /// Quote a USD to ETH swap, then submit it.
    pub fn quote_and_submit() -> Self {
        Self {
            name: "quote-and-submit".to_string(),
            description: "Quote USD to ETH and submit the swap".to_string(),
            steps: vec![
                ScenarioStep::Assert {
                    condition: AssertCondition::CanSubmit { expected: false },
                },
                ScenarioStep::SelectSell {
                    symbol: Some("USD".to_string()),
                },
                ScenarioStep::SelectBuy {
                    symbol: Some("ETH".to_string()),
                },
                ScenarioStep::Type {
                    text: "1500.5".to_string(),
                },
                ScenarioStep::Wait { millis: 700 },
                ScenarioStep::Assert {
                    condition: AssertCondition::BuyAmountPresent,
                },
                ScenarioStep::Assert {
                    condition: AssertCondition::CanSubmit { expected: true },
                },
                ScenarioStep::Submit,
            ],
        }
    }

    /// Quote, reverse the pair, and requote.
    pub fn pair_swap() -> Self {
        Self {
            name: "pair-swap".to_string(),
            description: "Reverse a quoted pair and let it requote".to_string(),
            steps: vec![
                ScenarioStep::SelectSell {
                    symbol: Some("USD".to_string()),
                },
                ScenarioStep::SelectBuy {
                    symbol: Some("ATOM".to_string()),
                },
                ScenarioStep::Type {
                    text: "250".to_string(),
                },
                ScenarioStep::Wait { millis: 700 },
                ScenarioStep::Assert {
                    condition: AssertCondition::BuyAmountPresent,
                },
                ScenarioStep::SwapPair,
                ScenarioStep::Wait { millis: 700 },
                ScenarioStep::Assert {
                    condition: AssertCondition::BuyAmountPresent,
                },
            ],
        }
    }

    /// Submit incomplete and malformed input.
    pub fn validation() -> Self {
        Self {
            name: "validation".to_string(),
            description: "Submit with missing fields, then with rejected keystrokes".to_string(),
            steps: vec![
                ScenarioStep::SelectSell {
                    symbol: Some("USD".to_string()),
                },
                ScenarioStep::Submit,
                ScenarioStep::Assert {
                    condition: AssertCondition::BannerEquals {
                        text: Some("Please fill in all fields.".to_string()),
                    },
                },
                ScenarioStep::SelectBuy {
                    symbol: Some("WBTC".to_string()),
                },
                ScenarioStep::Type {
                    text: "1.2.3x4".to_string(),
                },
                ScenarioStep::Assert {
                    condition: AssertCondition::SellAmountEquals {
                        amount: "1.234".to_string(),
                    },
                },
                ScenarioStep::Assert {
                    condition: AssertCondition::StateIs {
                        state: ExpectedState::Failed,
                    },
                },
            ],
        }
    }
}
