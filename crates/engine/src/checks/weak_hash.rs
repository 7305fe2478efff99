//! Weak cryptographic hash detection: MD5/SHA1 digest calls, HMACs built
//! on them, and OpenSSL digest construction with a weak algorithm name.

use ir::{CallRecord, ExprKind, ExprNode};

use crate::checks::{expect_calls, Check, Confidence, Finding, ReportedCalls};
use crate::index::{CallIndex, CallQuery, Selector, TargetFilter};
use crate::visitor::ExprWalker;

const WEAK_DIGEST_TARGETS: [&str; 4] = [
    "Digest::MD5",
    "Digest::SHA1",
    "OpenSSL::Digest::MD5",
    "OpenSSL::Digest::SHA1",
];

const DIGEST_METHODS: [&str; 4] = ["base64digest", "digest", "hexdigest", "new"];

#[derive(Debug, Default)]
/// Flags uses of weak hashing algorithms (MD5, SHA1).
pub struct WeakHash {
    reported: ReportedCalls,
}

impl Check for WeakHash {
    fn name(&self) -> &'static str {
        "weak_hash"
    }

    fn run(&mut self, index: &CallIndex<'_>) -> Vec<Finding> {
        let mut findings = Vec::new();

        // Nested occurrences matter here: `foo(Digest::MD5.digest(x))`
        // is as weak as a top-level digest call.
        let digests = CallQuery {
            target: TargetFilter::Is(Selector::any_of(WEAK_DIGEST_TARGETS)),
            nested: true,
            ..CallQuery::default()
        };
        for call in expect_calls(index, &digests, self.name()) {
            self.digest_result(call, &mut findings);
        }

        let hmacs = CallQuery {
            target: TargetFilter::Is(Selector::literal("Digest::HMAC")),
            method: Some(Selector::any_of(["new", "hexdigest"])),
            nested: true,
            ..CallQuery::default()
        };
        for call in expect_calls(index, &hmacs, self.name()) {
            self.hmac_result(call, &mut findings);
        }

        let openssl = CallQuery {
            target: TargetFilter::Is(Selector::any_of([
                "OpenSSL::Digest::Digest",
                "OpenSSL::Digest",
            ])),
            method: Some(Selector::literal("new")),
            ..CallQuery::default()
        };
        for call in expect_calls(index, &openssl, self.name()) {
            self.openssl_result(call, &mut findings);
        }

        findings
    }
}

impl WeakHash {
    fn digest_result(&mut self, call: &CallRecord, findings: &mut Vec<Finding>) {
        if !self.reported.record(call) {
            return;
        }

        let confidence = if DIGEST_METHODS.contains(&call.method.as_str())
            && (user_input_arg(call).is_some() || hashing_password(call))
        {
            Confidence::High
        } else {
            Confidence::Medium
        };

        let alg = match call.target.as_deref().and_then(last_segment) {
            Some("MD5") => " (MD5)",
            Some("SHA1") => " (SHA1)",
            _ => "",
        };

        findings.push(Finding {
            check: self.name().into(),
            category: "Weak Hash".into(),
            code: "weak_hash_digest".into(),
            message: format!("Weak hashing algorithm{alg} used"),
            confidence,
            evidence: call.meta.clone(),
        });
    }

    fn hmac_result(&mut self, call: &CallRecord, findings: &mut Vec<Finding>) {
        if !self.reported.record(call) {
            return;
        }

        // The third argument selects the digest class backing the HMAC.
        let alg = match call.arg(2).and_then(ExprNode::name).and_then(last_segment) {
            Some("MD5") => "MD5",
            Some("SHA1") => "SHA1",
            _ => return,
        };

        findings.push(Finding {
            check: self.name().into(),
            category: "Weak Hash".into(),
            code: "weak_hash_hmac".into(),
            message: format!("Weak hashing algorithm ({alg}) used in HMAC"),
            confidence: Confidence::Medium,
            evidence: call.meta.clone(),
        });
    }

    fn openssl_result(&mut self, call: &CallRecord, findings: &mut Vec<Finding>) {
        if !self.reported.record(call) {
            return;
        }

        let Some(arg) = call.arg(0) else { return };
        if arg.kind != ExprKind::Literal {
            return;
        }
        let Some(name) = arg.name() else { return };

        let alg = name.to_uppercase();
        if alg == "MD5" || alg == "SHA1" {
            findings.push(Finding {
                check: self.name().into(),
                category: "Weak Hash".into(),
                code: "weak_hash_digest".into(),
                message: format!("Weak hashing algorithm ({alg}) used"),
                confidence: Confidence::Medium,
                evidence: call.meta.clone(),
            });
        }
    }
}

fn last_segment(name: &str) -> Option<&str> {
    name.rsplit("::").next()
}

/// First argument whose subtree carries the tracker's user-input marker.
fn user_input_arg(call: &CallRecord) -> Option<&ExprNode> {
    call.arguments.iter().find(|arg| {
        let mut tainted = false;
        let mut walker = ExprWalker::new();
        for kind in ExprKind::ALL {
            walker = walker.on(kind, |node: &ExprNode, tainted: &mut bool| {
                if node.user_input {
                    *tainted = true;
                }
                !*tainted
            });
        }
        walker.walk(arg, &mut tainted);
        tainted
    })
}

/// Walks each argument looking for a password-like reference: a `password`
/// call, an `@password` instance variable or a `password` local. State is
/// reset per argument root.
fn hashing_password(call: &CallRecord) -> bool {
    call.arguments.iter().any(|arg| {
        let mut found = false;
        ExprWalker::new()
            .on(ExprKind::Call, |node: &ExprNode, found: &mut bool| {
                if node.name().is_some_and(is_password_name) {
                    *found = true;
                    return false;
                }
                true
            })
            .on(ExprKind::InstanceVar, |node: &ExprNode, found: &mut bool| {
                if node
                    .name()
                    .map(|n| n.trim_start_matches('@'))
                    .is_some_and(is_password_name)
                {
                    *found = true;
                }
                true
            })
            .on(ExprKind::LocalVar, |node: &ExprNode, found: &mut bool| {
                if node.name().is_some_and(is_password_name) {
                    *found = true;
                }
                true
            })
            .walk(arg, &mut found);
        found
    })
}

fn is_password_name(name: &str) -> bool {
    name == "password" || name.ends_with("_password")
}
