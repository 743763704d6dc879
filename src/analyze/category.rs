//! Keyword-frequency category classifier.
//!
//! Counts case-insensitive substring occurrences of every table keyword in
//! `title + " " + body`. Highest total wins; ties go to the earlier table row,
//! and an all-zero score falls back to the first row.

use crate::types::Category;

pub const CATEGORY_KEYWORDS: &[(Category, &[&str])] = &[
    (
        Category::Investing,
        &[
            "invest", "stock", "portfolio", "etf", "dividend", "bond", "index fund",
            "market", "crypto", "shares",
        ],
    ),
    (
        Category::Tax,
        &[
            "tax", "irs", "deduction", "bracket", "refund", "w-2", "1099", "filing",
            "write-off",
        ],
    ),
    (
        Category::Retirement,
        &[
            "retire", "401k", "401(k)", "ira", "pension", "social security", "annuity",
            "required minimum distribution",
        ],
    ),
    (
        Category::Budgeting,
        &[
            "budget", "saving", "expense", "spending", "emergency fund", "frugal",
            "grocer", "paycheck",
        ],
    ),
    (
        Category::Debt,
        &[
            "debt", "loan", "credit card", "credit score", "interest rate", "payoff",
            "refinanc", "bankruptcy",
        ],
    ),
    (
        Category::RealEstate,
        &[
            "mortgage", "real estate", "home price", "housing", "rent", "landlord",
            "down payment", "property",
        ],
    ),
];

fn count_occurrences(haystack: &str, needle: &str) -> usize {
    if needle.is_empty() {
        return 0;
    }
    haystack.matches(needle).count()
}

/// Per-category totals in table order.
pub fn category_scores(title: &str, body: &str) -> Vec<(Category, usize)> {
    let text = format!("{title} {body}").to_lowercase();
    CATEGORY_KEYWORDS
        .iter()
        .map(|(cat, words)| {
            let total = words.iter().map(|w| count_occurrences(&text, w)).sum();
            (*cat, total)
        })
        .collect()
}

pub fn classify_category(title: &str, body: &str) -> Category {
    let mut best = CATEGORY_KEYWORDS[0].0;
    let mut best_score = 0usize;
    for (cat, score) in category_scores(title, body) {
        // strict > keeps the earlier row on ties
        if score > best_score {
            best = cat;
            best_score = score;
        }
    }
    best
}
