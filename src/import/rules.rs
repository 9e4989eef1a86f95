//! Booking rules: map a transfer's parties to ledger accounts.
//!
//! A rule constrains any of `account`, `dbtr`, `cdtr`; a constraint that is
//! absent matches everything. Placeholder accounts (`Income:???`,
//! `Expenses:???`) are left where no rule decides, for the human to fill in
//! during capture.

use serde::Deserialize;

use super::statement::Transfer;

/// Creditor account used when no rule names one for an expense.
pub const UNKNOWN_EXPENSE_ACCOUNT: &str = "Expenses:???";
/// Debitor account used when no rule names one for an income.
pub const UNKNOWN_INCOME_ACCOUNT: &str = "Income:???";

/// One `[[rules]]` entry.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Rule {
    /// Statement account (config `[accounts.<name>]` key) this rule is for.
    pub account: Option<String>,
    /// Debitor party name.
    pub dbtr: Option<String>,
    /// Creditor party name.
    pub cdtr: Option<String>,
    /// Payee written to the transaction header.
    pub title: Option<String>,
    pub dbtr_acc: Option<String>,
    pub cdtr_acc: Option<String>,
    /// Fixed creditor-side split; replaces `cdtr_acc` when non-empty.
    pub splits: Vec<Split>,
}

/// `[account, amount]` pair of a split booking.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Split(pub String, pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKey {
    Account,
    Dbtr,
    Cdtr,
}

impl Rule {
    fn constraint(&self, key: RuleKey) -> Option<&str> {
        match key {
            RuleKey::Account => self.account.as_deref(),
            RuleKey::Dbtr => self.dbtr.as_deref(),
            RuleKey::Cdtr => self.cdtr.as_deref(),
        }
    }

    fn creditor_side(&self, fallback: &str) -> CreditSide {
        if !self.splits.is_empty() {
            return CreditSide::Splits(self.splits.clone());
        }
        CreditSide::Account(self.cdtr_acc.clone().unwrap_or_else(|| fallback.to_string()))
    }
}

/// Rules whose `key` constraint is absent or equal to `value`.
pub fn filter_rules<'a, I>(rules: I, key: RuleKey, value: Option<&str>) -> Vec<&'a Rule>
where
    I: IntoIterator<Item = &'a Rule>,
{
    rules
        .into_iter()
        .filter(|rule| match rule.constraint(key) {
            None => true,
            Some(expected) => Some(expected) == value,
        })
        .collect()
}

/// Where the money goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreditSide {
    Account(String),
    Splits(Vec<Split>),
}

/// Accounts and payee chosen for one transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Booking {
    pub title: String,
    pub creditor: CreditSide,
    pub debitor_acc: String,
}

/// Result of matching a transfer against the rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Matched {
    Single(Booking),
    /// Several rules fit equally well; the human picks one during capture.
    Ambiguous(Vec<Booking>),
}

/// Decide accounts for `transfer`.
///
/// No debitor rule means money from an unknown source (income). Exactly one
/// debitor rule is taken as is. Several debitor rules usually mean "paid by
/// me", so the creditor decides among them.
pub fn book_transfer(
    transfer: &Transfer,
    rules: &[Rule],
    account: Option<&str>,
    asset_account: &str,
) -> Matched {
    let account_rules = filter_rules(rules, RuleKey::Account, account);
    let by_debitor = filter_rules(
        account_rules,
        RuleKey::Dbtr,
        Some(transfer.debitor.as_str()),
    );

    match by_debitor.as_slice() {
        [] => Matched::Single(Booking {
            title: transfer.debitor.clone(),
            creditor: CreditSide::Account(asset_account.to_string()),
            debitor_acc: UNKNOWN_INCOME_ACCOUNT.to_string(),
        }),
        [rule] => Matched::Single(Booking {
            title: title_for(rule, transfer),
            creditor: rule.creditor_side(asset_account),
            debitor_acc: rule
                .dbtr_acc
                .clone()
                .unwrap_or_else(|| UNKNOWN_INCOME_ACCOUNT.to_string()),
        }),
        _ => {
            let by_creditor = filter_rules(
                by_debitor,
                RuleKey::Cdtr,
                Some(transfer.creditor.as_str()),
            );
            let expense = |rule: &Rule| Booking {
                title: title_for(rule, transfer),
                creditor: rule.creditor_side(UNKNOWN_EXPENSE_ACCOUNT),
                debitor_acc: rule
                    .dbtr_acc
                    .clone()
                    .unwrap_or_else(|| asset_account.to_string()),
            };
            match by_creditor.as_slice() {
                [] => Matched::Single(Booking {
                    title: transfer.creditor.clone(),
                    creditor: CreditSide::Account(UNKNOWN_EXPENSE_ACCOUNT.to_string()),
                    debitor_acc: asset_account.to_string(),
                }),
                [rule] => Matched::Single(expense(*rule)),
                many => Matched::Ambiguous(many.iter().map(|&rule| expense(rule)).collect()),
            }
        }
    }
}

fn title_for(rule: &Rule, transfer: &Transfer) -> String {
    rule.title
        .clone()
        .unwrap_or_else(|| transfer.creditor.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ASSET: &str = "Assets:Checking";

    fn transfer(debitor: &str, creditor: &str) -> Transfer {
        Transfer {
            book_date: "2021/01/01".into(),
            val_date: "2021/01/01".into(),
            debitor: debitor.into(),
            creditor: creditor.into(),
            amount: "10.00".into(),
            currency: "EUR".into(),
            subject: Vec::new(),
        }
    }

    fn rule(dbtr: Option<&str>, cdtr: Option<&str>) -> Rule {
        Rule {
            dbtr: dbtr.map(str::to_string),
            cdtr: cdtr.map(str::to_string),
            ..Rule::default()
        }
    }

    #[test]
    fn filter_keeps_unconstrained_and_equal_rules() {
        let rules = vec![
            rule(Some("Me"), None),
            rule(None, None),
            rule(Some("Other"), None),
        ];
        let kept = filter_rules(&rules, RuleKey::Dbtr, Some("Me"));
        assert_eq!(kept.len(), 2);
        let kept = filter_rules(&rules, RuleKey::Account, None);
        assert_eq!(kept.len(), 3);
    }

    #[test]
    fn unknown_debitor_books_income_placeholder() {
        let rules = vec![rule(Some("Me"), Some("Grocer"))];
        let booked = book_transfer(&transfer("Employer", "Me"), &rules, None, ASSET);
        let Matched::Single(booking) = booked else {
            panic!("expected single booking");
        };
        assert_eq!(booking.title, "Employer");
        assert_eq!(booking.creditor, CreditSide::Account(ASSET.into()));
        assert_eq!(booking.debitor_acc, UNKNOWN_INCOME_ACCOUNT);
    }

    #[test]
    fn single_debitor_rule_is_taken_as_is() {
        let rules = vec![Rule {
            dbtr: Some("Employer".into()),
            title: Some("Salary".into()),
            dbtr_acc: Some("Income:Salary".into()),
            ..Rule::default()
        }];
        let matched = book_transfer(&transfer("Employer", "Me"), &rules, None, ASSET);
        assert_eq!(
            matched,
            Matched::Single(Booking {
                title: "Salary".into(),
                creditor: CreditSide::Account(ASSET.into()),
                debitor_acc: "Income:Salary".into(),
            })
        );
    }

    #[test]
    fn unknown_creditor_books_expense_placeholder() {
        let rules = vec![rule(Some("Me"), Some("Grocer")), rule(Some("Me"), Some("Landlord"))];
        let Matched::Single(booking) = book_transfer(&transfer("Me", "Cinema"), &rules, None, ASSET)
        else {
            panic!("expected single booking");
        };
        assert_eq!(booking.title, "Cinema");
        assert_eq!(
            booking.creditor,
            CreditSide::Account(UNKNOWN_EXPENSE_ACCOUNT.into())
        );
        assert_eq!(booking.debitor_acc, ASSET);
    }

    #[test]
    fn known_creditor_uses_rule_accounts_and_splits() {
        let rules = vec![
            Rule {
                dbtr: Some("Me".into()),
                cdtr: Some("Grocer".into()),
                splits: vec![
                    Split("Expenses:Food".into(), "7.00".into()),
                    Split("Expenses:Household".into(), "3.00".into()),
                ],
                ..Rule::default()
            },
            rule(Some("Me"), Some("Landlord")),
        ];
        let Matched::Single(booking) = book_transfer(&transfer("Me", "Grocer"), &rules, None, ASSET)
        else {
            panic!("expected single booking");
        };
        assert_eq!(booking.title, "Grocer");
        assert!(matches!(booking.creditor, CreditSide::Splits(ref s) if s.len() == 2));
        assert_eq!(booking.debitor_acc, ASSET);
    }

    #[test]
    fn several_creditor_rules_are_ambiguous() {
        let rules = vec![
            Rule {
                cdtr_acc: Some("Expenses:A".into()),
                ..rule(Some("Me"), Some("Shop"))
            },
            Rule {
                cdtr_acc: Some("Expenses:B".into()),
                ..rule(Some("Me"), None)
            },
        ];
        let booked = book_transfer(&transfer("Me", "Shop"), &rules, None, ASSET);
        let Matched::Ambiguous(options) = booked else {
            panic!("expected ambiguous match");
        };
        assert_eq!(options.len(), 2);
        assert_eq!(options[1].creditor, CreditSide::Account("Expenses:B".into()));
    }

    #[test]
    fn rules_for_other_accounts_are_ignored() {
        let rules = vec![Rule {
            account: Some("savings".into()),
            dbtr: Some("Employer".into()),
            dbtr_acc: Some("Income:Salary".into()),
            ..Rule::default()
        }];
        let Matched::Single(booking) =
            book_transfer(&transfer("Employer", "Me"), &rules, Some("checking"), ASSET)
        else {
            panic!("expected single booking");
        };
        assert_eq!(booking.debitor_acc, UNKNOWN_INCOME_ACCOUNT);
    }
}
