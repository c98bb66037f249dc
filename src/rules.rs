//! Static compliance-rule catalog: MAS Notice 626 AML/CFT, PDPA, cross-border
//! and sanctions obligations for Singapore financial institutions.
//!
//! The catalog drives prompt construction: [`relevant_rules`] picks the rules
//! whose keywords appear in a document chunk, and [`prompt_digest`] renders a
//! bounded summary of them for the model. Keeping the rules as plain static
//! data means the whole module is usable from tests and the CLI without any
//! I/O or setup.

use std::fmt;

/// Regulatory family a rule belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleCategory {
    /// MAS Notice 626 anti-money-laundering / counter-financing-of-terrorism.
    Aml,
    /// Personal Data Protection Act obligations.
    DataProtection,
    /// Cross-border transaction monitoring and reporting.
    CrossBorder,
    /// Sanctions and watchlist screening.
    Sanctions,
}

impl RuleCategory {
    /// Heading used when rendering rules of this category into a prompt.
    pub fn label(self) -> &'static str {
        match self {
            RuleCategory::Aml => "MAS 626 AML/CFT Rules",
            RuleCategory::DataProtection => "PDPA Rules",
            RuleCategory::CrossBorder => "Cross-Border Rules",
            RuleCategory::Sanctions => "Sanctions Rules",
        }
    }
}

impl fmt::Display for RuleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One compliance obligation with the criteria used to match it to documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplianceRule {
    pub id: &'static str,
    pub title: &'static str,
    pub category: RuleCategory,
    /// Regulatory impact on the 1–5 scale used for report flags.
    pub severity: u8,
    pub description: &'static str,
    pub requirements: &'static [&'static str],
    /// Lowercase-insensitive phrases that mark a document as relevant.
    pub keywords: &'static [&'static str],
    pub mas_reference: &'static str,
    pub pdpa_reference: &'static str,
}

/// Full catalog, grouped by category.
pub const RULES: &[ComplianceRule] = &[
    // ── MAS Notice 626 AML/CFT ───────────────────────────────────────────
    ComplianceRule {
        id: "mas_626_cdd_001",
        title: "Customer Due Diligence (CDD) Requirements",
        category: RuleCategory::Aml,
        severity: 5,
        description: "Financial institutions must conduct CDD on all customers before establishing business relationships",
        requirements: &[
            "Verify customer identity using reliable documents",
            "Identify beneficial owners of legal entities",
            "Understand the nature and purpose of the business relationship",
            "Conduct ongoing monitoring of the business relationship",
        ],
        keywords: &[
            "customer identification",
            "identity verification",
            "beneficial owner",
            "CDD",
            "due diligence",
        ],
        mas_reference: "MAS 626 Section 4.1",
        pdpa_reference: "",
    },
    ComplianceRule {
        id: "mas_626_edd_001",
        title: "Enhanced Due Diligence (EDD) for High-Risk Customers",
        category: RuleCategory::Aml,
        severity: 5,
        description: "Enhanced due diligence must be applied to high-risk customers including PEPs",
        requirements: &[
            "Obtain senior management approval for high-risk relationships",
            "Conduct enhanced monitoring of transactions",
            "Obtain additional information about source of funds",
            "Conduct more frequent reviews of the relationship",
        ],
        keywords: &[
            "enhanced due diligence",
            "PEP",
            "politically exposed person",
            "high risk",
            "EDD",
        ],
        mas_reference: "MAS 626 Section 4.2",
        pdpa_reference: "",
    },
    ComplianceRule {
        id: "mas_626_suspicious_001",
        title: "Suspicious Transaction Reporting",
        category: RuleCategory::Aml,
        severity: 5,
        description: "Financial institutions must report suspicious transactions to the Suspicious Transaction Reporting Office",
        requirements: &[
            "Report suspicious transactions within 15 days of detection",
            "Maintain confidentiality of STRs",
            "Provide complete and accurate information",
            "Follow up on additional information requests",
        ],
        keywords: &[
            "suspicious transaction",
            "STR",
            "suspicious activity",
            "reporting",
            "STRO",
        ],
        mas_reference: "MAS 626 Section 5.1",
        pdpa_reference: "",
    },
    ComplianceRule {
        id: "mas_626_record_001",
        title: "Record Keeping Requirements",
        category: RuleCategory::Aml,
        severity: 4,
        description: "Financial institutions must maintain records for at least 5 years",
        requirements: &[
            "Maintain customer identification records",
            "Keep transaction records for 5 years",
            "Store records in a readily retrievable format",
            "Ensure records are accessible to MAS upon request",
        ],
        keywords: &[
            "record keeping",
            "5 years",
            "customer records",
            "transaction records",
            "retention",
        ],
        mas_reference: "MAS 626 Section 6.1",
        pdpa_reference: "",
    },
    ComplianceRule {
        id: "mas_626_risk_001",
        title: "Risk Assessment and Management",
        category: RuleCategory::Aml,
        severity: 4,
        description: "Financial institutions must implement comprehensive risk assessment frameworks",
        requirements: &[
            "Conduct regular risk assessments",
            "Implement risk-based controls",
            "Review and update risk assessments annually",
            "Document risk management processes",
        ],
        keywords: &[
            "risk assessment",
            "risk management",
            "risk-based",
            "controls",
            "framework",
        ],
        mas_reference: "MAS 626 Section 3.1",
        pdpa_reference: "",
    },
    // ── PDPA ─────────────────────────────────────────────────────────────
    ComplianceRule {
        id: "pdpa_consent_001",
        title: "Consent Management",
        category: RuleCategory::DataProtection,
        severity: 4,
        description: "Organizations must obtain valid consent before collecting personal data",
        requirements: &[
            "Obtain clear and specific consent",
            "Inform individuals of purpose of collection",
            "Allow withdrawal of consent",
            "Maintain consent records",
        ],
        keywords: &["consent", "personal data", "collection", "purpose", "withdrawal"],
        mas_reference: "",
        pdpa_reference: "PDPA Section 15",
    },
    ComplianceRule {
        id: "pdpa_purpose_001",
        title: "Purpose Limitation",
        category: RuleCategory::DataProtection,
        severity: 4,
        description: "Personal data must be collected for specific, legitimate purposes",
        requirements: &[
            "Specify purpose of data collection",
            "Use data only for stated purposes",
            "Obtain consent for additional uses",
            "Document purpose limitations",
        ],
        keywords: &[
            "purpose limitation",
            "legitimate purpose",
            "data use",
            "specific purpose",
        ],
        mas_reference: "",
        pdpa_reference: "PDPA Section 18",
    },
    ComplianceRule {
        id: "pdpa_accuracy_001",
        title: "Data Accuracy and Completeness",
        category: RuleCategory::DataProtection,
        severity: 3,
        description: "Organizations must ensure personal data is accurate and complete",
        requirements: &[
            "Verify accuracy of personal data",
            "Update data when necessary",
            "Correct inaccurate data promptly",
            "Implement data quality controls",
        ],
        keywords: &[
            "data accuracy",
            "data completeness",
            "data quality",
            "verification",
            "correction",
        ],
        mas_reference: "",
        pdpa_reference: "PDPA Section 20",
    },
    ComplianceRule {
        id: "pdpa_retention_001",
        title: "Data Retention and Disposal",
        category: RuleCategory::DataProtection,
        severity: 4,
        description: "Personal data must not be retained longer than necessary",
        requirements: &[
            "Establish retention periods",
            "Implement secure disposal methods",
            "Document retention policies",
            "Regular review of retained data",
        ],
        keywords: &[
            "data retention",
            "data disposal",
            "retention period",
            "secure disposal",
        ],
        mas_reference: "",
        pdpa_reference: "PDPA Section 25",
    },
    ComplianceRule {
        id: "pdpa_breach_001",
        title: "Data Breach Notification",
        category: RuleCategory::DataProtection,
        severity: 5,
        description: "Organizations must notify PDPC of data breaches within 72 hours",
        requirements: &[
            "Notify PDPC within 72 hours",
            "Assess impact of breach",
            "Notify affected individuals if necessary",
            "Implement remedial measures",
        ],
        keywords: &["data breach", "notification", "72 hours", "PDPC", "breach response"],
        mas_reference: "",
        pdpa_reference: "PDPA Section 26",
    },
    ComplianceRule {
        id: "pdpa_crossborder_001",
        title: "Cross-Border Data Transfer",
        category: RuleCategory::DataProtection,
        severity: 4,
        description: "Cross-border transfers must comply with PDPA requirements",
        requirements: &[
            "Ensure adequate protection in destination country",
            "Obtain consent for cross-border transfers",
            "Implement appropriate safeguards",
            "Document transfer agreements",
        ],
        keywords: &[
            "cross-border",
            "data transfer",
            "international",
            "safeguards",
            "protection",
        ],
        mas_reference: "",
        pdpa_reference: "PDPA Section 26",
    },
    // ── Cross-border transactions ────────────────────────────────────────
    ComplianceRule {
        id: "cbt_monitoring_001",
        title: "Cross-Border Transaction Monitoring",
        category: RuleCategory::CrossBorder,
        severity: 4,
        description: "Financial institutions must monitor cross-border transactions for compliance",
        requirements: &[
            "Implement transaction monitoring systems",
            "Flag unusual cross-border patterns",
            "Conduct enhanced due diligence",
            "Report suspicious cross-border activities",
        ],
        keywords: &[
            "cross-border",
            "transaction monitoring",
            "unusual patterns",
            "enhanced due diligence",
        ],
        mas_reference: "MAS 626 Section 4.3",
        pdpa_reference: "",
    },
    ComplianceRule {
        id: "cbt_reporting_001",
        title: "Cross-Border Transaction Reporting",
        category: RuleCategory::CrossBorder,
        severity: 4,
        description: "Certain cross-border transactions must be reported to authorities",
        requirements: &[
            "Report large cross-border transactions",
            "Maintain transaction records",
            "Comply with reporting thresholds",
            "Submit reports within required timeframes",
        ],
        keywords: &[
            "cross-border reporting",
            "large transactions",
            "reporting threshold",
            "transaction records",
        ],
        mas_reference: "MAS 626 Section 5.2",
        pdpa_reference: "",
    },
    // ── Sanctions ────────────────────────────────────────────────────────
    ComplianceRule {
        id: "sanctions_screening_001",
        title: "Sanctions and Watchlist Screening",
        category: RuleCategory::Sanctions,
        severity: 5,
        description: "Financial institutions must screen against sanctions and watchlists",
        requirements: &[
            "Screen customers against sanctions lists",
            "Screen transactions against watchlists",
            "Implement real-time screening",
            "Maintain updated sanctions databases",
        ],
        keywords: &["sanctions", "watchlist", "screening", "OFAC", "UN sanctions"],
        mas_reference: "MAS 626 Section 4.4",
        pdpa_reference: "",
    },
];

/// Every rule in catalog order.
pub fn all_rules() -> impl Iterator<Item = &'static ComplianceRule> {
    RULES.iter()
}

/// Rules belonging to one regulatory family, in catalog order.
pub fn rules_for_category(
    category: RuleCategory,
) -> impl Iterator<Item = &'static ComplianceRule> {
    RULES.iter().filter(move |rule| rule.category == category)
}

/// Look up a rule by its stable identifier.
pub fn rule_by_id(id: &str) -> Option<&'static ComplianceRule> {
    RULES.iter().find(|rule| rule.id == id)
}

/// Case-insensitive substring search over title, description, and keywords.
pub fn search_rules(query: &str) -> Vec<&'static ComplianceRule> {
    let query = query.to_lowercase();
    if query.trim().is_empty() {
        return Vec::new();
    }
    RULES
        .iter()
        .filter(|rule| {
            rule.title.to_lowercase().contains(&query)
                || rule.description.to_lowercase().contains(&query)
                || rule
                    .keywords
                    .iter()
                    .any(|kw| kw.to_lowercase().contains(&query))
        })
        .collect()
}

/// Rules whose keywords appear in `text`, ranked by number of keyword hits
/// (catalog order breaks ties). Drives prompt context selection.
pub fn relevant_rules(text: &str) -> Vec<&'static ComplianceRule> {
    let text = text.to_lowercase();
    let mut scored: Vec<(usize, &'static ComplianceRule)> = RULES
        .iter()
        .filter_map(|rule| {
            let hits = rule
                .keywords
                .iter()
                .filter(|kw| text.contains(&kw.to_lowercase()))
                .count();
            (hits > 0).then_some((hits, rule))
        })
        .collect();
    scored.sort_by_key(|(hits, _)| std::cmp::Reverse(*hits));
    scored.into_iter().map(|(_, rule)| rule).collect()
}

/// Per-category cap on the number of rules rendered into a prompt.
fn digest_cap(category: RuleCategory) -> usize {
    match category {
        RuleCategory::Aml | RuleCategory::DataProtection => 5,
        RuleCategory::CrossBorder | RuleCategory::Sanctions => 3,
    }
}

/// Render a bounded digest of `rules` for inclusion in the user prompt:
/// one `**heading:**` block per represented category, each listing at most
/// the category's cap of `- title: description` lines.
pub fn prompt_digest(rules: &[&ComplianceRule]) -> String {
    use std::fmt::Write;

    let categories = [
        RuleCategory::Aml,
        RuleCategory::DataProtection,
        RuleCategory::CrossBorder,
        RuleCategory::Sanctions,
    ];

    let mut digest = String::new();
    for category in categories {
        let mut picked = rules
            .iter()
            .filter(|rule| rule.category == category)
            .take(digest_cap(category))
            .peekable();
        if picked.peek().is_none() {
            continue;
        }
        if !digest.is_empty() {
            digest.push('\n');
        }
        let _ = writeln!(digest, "**{}:**", category.label());
        for rule in picked {
            let _ = writeln!(digest, "- {}: {}", rule.title, rule.description);
        }
    }
    digest
}
