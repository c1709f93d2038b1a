//! Built-in framework requirement tables.
//!
//! Hour estimates are generic industry benchmarks, not derived from any
//! proprietary analysis; adjust them by registering a custom catalogue.

use crate::framework::AutomationLevel::{FullyAutomated, Manual, SemiAutomated};
use crate::framework::{AutomationLevel, FrameworkRequirement};

fn req(
    framework: &str,
    id: &str,
    description: &str,
    baseline_manual_hours: f64,
    level: AutomationLevel,
) -> FrameworkRequirement {
    FrameworkRequirement::new(framework, id, description, baseline_manual_hours, level)
}

pub(crate) fn builtins() -> Vec<(&'static str, &'static str, Vec<FrameworkRequirement>)> {
    vec![
        ("eu_ai_act", "2024", eu_ai_act()),
        ("gdpr", "2018", gdpr()),
        ("hipaa", "2013", hipaa()),
        ("soc2", "2017", soc2()),
    ]
}

fn eu_ai_act() -> Vec<FrameworkRequirement> {
    let f = "eu_ai_act";
    vec![
        req(f, "A6_risk_classification", "Article 6: Classify the AI system under the risk taxonomy.", 40.0, SemiAutomated),
        req(f, "A9_risk_mgmt_system", "Article 9: Establish and maintain a risk management system.", 80.0, SemiAutomated),
        req(f, "A10_data_governance", "Article 10: Data governance over training, validation, and testing datasets.", 60.0, SemiAutomated),
        req(f, "A11_technical_documentation", "Article 11: Maintain technical documentation before market placement.", 30.0, FullyAutomated),
        req(f, "A12_record_keeping", "Article 12: Automatic logging of events throughout the system lifetime.", 20.0, FullyAutomated),
        req(f, "A13_transparency", "Article 13: Transparency so users understand AI outputs.", 25.0, SemiAutomated),
        req(f, "A14_human_oversight", "Article 14: Enable effective human oversight during operation.", 35.0, SemiAutomated),
        req(f, "A15_accuracy_robustness", "Article 15: Accuracy, robustness, and cybersecurity requirements.", 50.0, SemiAutomated),
        req(f, "A16_conformity_assessment", "Article 16: Provider obligations and conformity assessment procedures.", 60.0, Manual),
        req(f, "A52_ai_disclosure", "Article 52: Disclose that users are interacting with an AI system.", 10.0, FullyAutomated),
        req(f, "A60_eu_database_registration", "Article 60: Register high-risk AI systems in the EU database.", 15.0, Manual),
        req(f, "A72_post_market_monitoring", "Article 72: Establish a post-market monitoring system.", 40.0, SemiAutomated),
    ]
}

fn gdpr() -> Vec<FrameworkRequirement> {
    let f = "gdpr";
    vec![
        req(f, "A5_lawfulness", "Article 5: Ensure lawfulness, fairness, and transparency of processing.", 30.0, SemiAutomated),
        req(f, "A6_legal_basis", "Article 6: Identify and document the legal basis for each processing activity.", 20.0, Manual),
        req(f, "A13_14_privacy_notice", "Articles 13/14: Provide privacy notices to data subjects.", 15.0, SemiAutomated),
        req(f, "A17_right_erasure", "Article 17: Implement the right to erasure (right to be forgotten).", 40.0, SemiAutomated),
        req(f, "A20_data_portability", "Article 20: Implement data portability for data subjects.", 30.0, SemiAutomated),
        req(f, "A25_privacy_by_design", "Article 25: Implement privacy by design and by default.", 60.0, Manual),
        req(f, "A30_ropa", "Article 30: Maintain Records of Processing Activities.", 25.0, FullyAutomated),
        req(f, "A32_security_measures", "Article 32: Implement appropriate technical and organisational security measures.", 50.0, SemiAutomated),
        req(f, "A33_breach_notification", "Article 33: 72-hour data breach notification to the supervisory authority.", 20.0, SemiAutomated),
        req(f, "A35_dpia", "Article 35: Conduct Data Protection Impact Assessments for high-risk processing.", 80.0, Manual),
        req(f, "A37_dpo", "Article 37: Appoint a Data Protection Officer where required.", 10.0, Manual),
        req(f, "A44_transfers", "Article 44: Ensure adequate safeguards for international data transfers.", 40.0, Manual),
    ]
}

fn hipaa() -> Vec<FrameworkRequirement> {
    let f = "hipaa";
    vec![
        req(f, "164_308a_risk_analysis", "164.308(a)(1)(ii)(A): Conduct accurate and thorough risk analysis.", 60.0, SemiAutomated),
        req(f, "164_308a_workforce_training", "164.308(a)(5): Implement a security awareness and training program.", 40.0, SemiAutomated),
        req(f, "164_308a_access_management", "164.308(a)(4): Implement role-based access management for PHI.", 30.0, FullyAutomated),
        req(f, "164_310_physical_safeguards", "164.310: Physical safeguards for workstations accessing PHI.", 20.0, Manual),
        req(f, "164_312_access_control", "164.312(a)(1): Technical access control with unique user identification.", 20.0, FullyAutomated),
        req(f, "164_312_audit_controls", "164.312(b): Audit controls across hardware, software, and procedures.", 25.0, FullyAutomated),
        req(f, "164_312_integrity", "164.312(c)(1): Protect PHI from improper alteration or destruction.", 30.0, SemiAutomated),
        req(f, "164_312_encryption", "164.312(e)(2)(ii): Encryption of PHI in transit and at rest.", 20.0, FullyAutomated),
        req(f, "164_314_baa", "164.314(a): Business Associate Agreements with all covered vendors.", 30.0, Manual),
        req(f, "164_400_breach_notification", "164.400: Notify affected individuals of breaches within 60 days.", 20.0, SemiAutomated),
        req(f, "164_520_notice_privacy", "164.520: Notice of Privacy Practices to patients.", 15.0, SemiAutomated),
        req(f, "164_524_access_phi", "164.524: Individual right to access their PHI within 30 days.", 25.0, SemiAutomated),
    ]
}

fn soc2() -> Vec<FrameworkRequirement> {
    let f = "soc2";
    vec![
        req(f, "CC6_security", "CC6: Logical and physical access controls with authentication and access monitoring.", 50.0, SemiAutomated),
        req(f, "A1_availability", "A1: System availability meeting committed performance and uptime objectives.", 30.0, FullyAutomated),
        req(f, "PI1_processing_integrity", "PI1: Complete, valid, accurate, timely, and authorised system processing.", 40.0, SemiAutomated),
        req(f, "C1_confidentiality", "C1: Confidential information protected via encryption and access controls.", 35.0, SemiAutomated),
        req(f, "P1_privacy", "P1: Personal information handled in conformity with the privacy notice.", 45.0, Manual),
    ]
}
