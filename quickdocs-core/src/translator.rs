//! Natural-language pattern translator.
//!
//! Converts a free-text question into a parameterized SQL query over the
//! tracking schema. There is no tokenization or semantic parsing here: the
//! question is trimmed, lower-cased, and searched against a fixed, ordered
//! table of regular expressions. The first rule that matches wins; if none
//! match, the question was not understood and `None` is returned.
//!
//! Captured substrings are never spliced into the SQL text. A matching rule
//! produces a [`Translation`]: a SQL string whose `?` placeholders line up
//! with the `params` vector, bound by the engine at execution time.

use std::sync::LazyLock;

use regex::{Captures, Regex};

/// A resolved query: SQL text plus positional bind parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    /// SQL with one `?` placeholder per entry in `params`.
    pub sql: String,
    /// Bind parameters, in placeholder order.
    pub params: Vec<String>,
}

impl Translation {
    fn fixed(sql: &str) -> Self {
        Self {
            sql: sql.to_string(),
            params: Vec::new(),
        }
    }
}

/// How a matched rule produces its query.
enum RuleAction {
    /// The SQL is constant; nothing is extracted from the question.
    Fixed(&'static str),
    /// The SQL takes bind parameters built from the rule's capture groups.
    Templated(fn(&Captures) -> Translation),
}

/// One (trigger, action) entry in the pattern table.
struct PatternRule {
    trigger: Regex,
    action: RuleAction,
}

const SQL_ALL_CUSTOMERS: &str =
    "SELECT id, name, email, phone, registration_date FROM customers ORDER BY registration_date DESC";

const SQL_PENDING_PROCESSES: &str = "\
SELECT pa.id, c.name AS customer_name, p.name AS process_name,
       pa.assignment_date, pa.completion_percentage
FROM process_assignments pa
JOIN customers c ON pa.customer_id = c.id
JOIN processes p ON pa.process_id = p.id
WHERE pa.status = 'pending'
ORDER BY pa.assignment_date";

const SQL_DOCUMENTS_BY_CUSTOMER: &str = "\
SELECT c.name AS customer_name, COUNT(ds.id) AS documents_submitted
FROM customers c
LEFT JOIN document_submissions ds ON c.id = ds.customer_id
WHERE LOWER(c.name) LIKE ?
GROUP BY c.id, c.name";

// Ties on the document count are broken lexically by process name so the
// answer does not depend on SQLite's row ordering.
const SQL_BUSIEST_PROCESS: &str = "\
SELECT p.name AS process_name, COUNT(ds.id) AS document_count
FROM processes p
LEFT JOIN document_submissions ds ON p.id = ds.process_id
GROUP BY p.id, p.name
ORDER BY document_count DESC, p.name ASC
LIMIT 1";

const SQL_CUSTOMERS_IN_PROCESS: &str = "\
SELECT c.name AS customer_name, pa.assignment_date, pa.status, pa.completion_percentage
FROM customers c
JOIN process_assignments pa ON c.id = pa.customer_id
JOIN processes p ON pa.process_id = p.id
WHERE LOWER(p.name) LIKE ?
ORDER BY pa.assignment_date";

const SQL_COMPLETED_PROCESSES: &str = "\
SELECT c.name AS customer_name, p.name AS process_name, pa.completion_percentage
FROM process_assignments pa
JOIN customers c ON pa.customer_id = c.id
JOIN processes p ON pa.process_id = p.id
WHERE pa.status = 'completed'
ORDER BY pa.assignment_date";

const SQL_ALL_PROCESSES: &str =
    "SELECT id, name, description, status, created_at FROM processes ORDER BY name";

const SQL_DOCUMENT_TYPES: &str =
    "SELECT id, name, description FROM document_types ORDER BY name";

const SQL_RECENT_SUBMISSIONS: &str = "\
SELECT c.name AS customer_name, p.name AS process_name, dt.name AS document_type,
       ds.upload_date, ds.validation_status
FROM document_submissions ds
JOIN customers c ON ds.customer_id = c.id
JOIN processes p ON ds.process_id = p.id
JOIN document_types dt ON ds.document_type_id = dt.id
ORDER BY ds.upload_date DESC
LIMIT 10";

/// The pattern table. Order is significant: the first rule whose trigger
/// matches the normalized question wins, so more specific phrasings must
/// come before broader ones. Capture-bearing branches that run to the end of
/// the question are anchored with `$`; under search semantics a lazy `(.+?)`
/// followed only by an optional `?` would otherwise capture a single
/// character.
static RULES: LazyLock<Vec<PatternRule>> = LazyLock::new(|| {
    vec![
        rule(
            r"show all customers?|list all customers?|get all customers?",
            RuleAction::Fixed(SQL_ALL_CUSTOMERS),
        ),
        rule(
            r"list all pending processes?|show pending processes?|get pending processes?",
            RuleAction::Fixed(SQL_PENDING_PROCESSES),
        ),
        rule(
            r"how many documents has (.+?) submitted\??|documents submitted by (.+?)\??$",
            RuleAction::Templated(documents_by_customer),
        ),
        rule(
            r"which process has the most documents\??|process with most documents\??",
            RuleAction::Fixed(SQL_BUSIEST_PROCESS),
        ),
        rule(
            r"which customers are assigned to (.+?)\??$|customers in (.+?)\??$|customers for (.+?)\??$",
            RuleAction::Templated(customers_in_process),
        ),
        rule(
            r"show completed processes?|list completed processes?",
            RuleAction::Fixed(SQL_COMPLETED_PROCESSES),
        ),
        rule(
            r"show all processes?|list all processes?",
            RuleAction::Fixed(SQL_ALL_PROCESSES),
        ),
        rule(
            r"show all document types?|list document types?",
            RuleAction::Fixed(SQL_DOCUMENT_TYPES),
        ),
        rule(
            r"show recent submissions?|recent documents?",
            RuleAction::Fixed(SQL_RECENT_SUBMISSIONS),
        ),
    ]
});

fn rule(trigger: &str, action: RuleAction) -> PatternRule {
    PatternRule {
        trigger: Regex::new(trigger).unwrap(),
        action,
    }
}

/// First populated capture group, trimmed. Alternation branches each carry
/// their own group, so which one is populated depends on the branch that
/// matched; always reading group 1 would break on later branches.
fn first_capture<'t>(caps: &Captures<'t>) -> &'t str {
    caps.iter()
        .skip(1)
        .flatten()
        .next()
        .map(|m| m.as_str().trim())
        .unwrap_or_default()
}

fn documents_by_customer(caps: &Captures) -> Translation {
    Translation {
        sql: SQL_DOCUMENTS_BY_CUSTOMER.to_string(),
        params: vec![format!("%{}%", first_capture(caps))],
    }
}

fn customers_in_process(caps: &Captures) -> Translation {
    Translation {
        sql: SQL_CUSTOMERS_IN_PROCESS.to_string(),
        params: vec![format!("%{}%", first_capture(caps))],
    }
}

/// Translate a free-text question into a parameterized query.
///
/// Returns `None` when no rule matches; that is a normal outcome, not a
/// fault — the caller should ask the user to rephrase. The function holds no
/// state and never fails.
///
/// # Example
///
/// ```
/// use quickdocs_core::translate;
///
/// let t = translate("how many documents has Jane Doe submitted?").unwrap();
/// assert_eq!(t.params, vec!["%jane doe%".to_string()]);
/// ```
pub fn translate(question: &str) -> Option<Translation> {
    let normalized = question.trim().to_lowercase();

    for rule in RULES.iter() {
        match &rule.action {
            RuleAction::Fixed(sql) => {
                if rule.trigger.is_match(&normalized) {
                    return Some(Translation::fixed(sql));
                }
            }
            RuleAction::Templated(build) => {
                if let Some(caps) = rule.trigger.captures(&normalized) {
                    return Some(build(&caps));
                }
            }
        }
    }

    None
}
