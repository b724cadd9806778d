//! One-shot notices carried across the `POST /predict` redirect.
//!
//! The notice travels in a cookie signed with the configured secret key. The home page
//! reads it once, renders it, and clears it, so no server-side session store is needed.

use std::fmt::Write as _;

use axum::http::{header, HeaderMap};
use hmac::{Hmac, Mac};
use serde::Serialize;
use sha2::Sha256;

use super::domain::LoanVerdict;

type HmacSha256 = Hmac<Sha256>;

pub const NOTICE_COOKIE: &str = "loan_notice";
/// Message bytes kept in a sealed notice; hex doubles it, well under the 4096-byte cookie limit.
const MAX_NOTICE_BYTES: usize = 1024;

pub const CLEAR_NOTICE_COOKIE: &str = "loan_notice=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Success,
    Danger,
}

impl NoticeLevel {
    pub fn label(self) -> &'static str {
        match self {
            NoticeLevel::Success => "success",
            NoticeLevel::Danger => "danger",
        }
    }

    fn from_label(value: &str) -> Option<Self> {
        match value {
            "success" => Some(NoticeLevel::Success),
            "danger" => Some(NoticeLevel::Danger),
            _ => None,
        }
    }
}

/// User-facing status attached to exactly one response cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn danger(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Danger,
            message: message.into(),
        }
    }
}

impl From<LoanVerdict> for Notice {
    fn from(verdict: LoanVerdict) -> Self {
        match verdict {
            LoanVerdict::Approved => Notice::success("Loan Approved"),
            LoanVerdict::Rejected => Notice::danger("Loan Rejected"),
        }
    }
}

/// Seals notices into tamper-evident cookie values.
#[derive(Clone)]
pub struct NoticeSigner {
    mac: HmacSha256,
}

impl NoticeSigner {
    pub fn new(secret_key: &str) -> Self {
        let mac = HmacSha256::new_from_slice(secret_key.as_bytes())
            .expect("HMAC accepts keys of any length");
        Self { mac }
    }

    fn signature(&self, payload: &str) -> Vec<u8> {
        let mut mac = self.mac.clone();
        mac.update(payload.as_bytes());
        mac.finalize().into_bytes().to_vec()
    }

    /// Cookie value: `<level>.<hex message>.<hex signature>`. Long messages are cut short.
    pub fn seal(&self, notice: &Notice) -> String {
        let payload = format!(
            "{}.{}",
            notice.level.label(),
            encode_hex(bounded(&notice.message).as_bytes())
        );
        let signature = encode_hex(&self.signature(&payload));
        format!("{payload}.{signature}")
    }

    pub fn open(&self, value: &str) -> Option<Notice> {
        let (payload, signature) = value.rsplit_once('.')?;
        let signature = decode_hex(signature)?;
        let mut mac = self.mac.clone();
        mac.update(payload.as_bytes());
        mac.verify_slice(&signature).ok()?;

        let (level, message) = payload.split_once('.')?;
        let level = NoticeLevel::from_label(level)?;
        let message = String::from_utf8(decode_hex(message)?).ok()?;
        Some(Notice { level, message })
    }

    pub fn set_cookie(&self, notice: &Notice) -> String {
        format!(
            "{NOTICE_COOKIE}={}; Path=/; HttpOnly; SameSite=Lax",
            self.seal(notice)
        )
    }

    /// Read the pending notice. The outer `Option` reports whether a notice cookie was
    /// present at all, so callers can clear it even when it fails verification.
    pub fn take(&self, headers: &HeaderMap) -> Option<Option<Notice>> {
        let value = notice_cookie(headers)?;
        Some(self.open(&value))
    }
}

fn bounded(message: &str) -> String {
    if message.len() <= MAX_NOTICE_BYTES {
        return message.to_string();
    }
    let mut cut = MAX_NOTICE_BYTES - '…'.len_utf8();
    while !message.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…", &message[..cut])
}

fn notice_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|raw| raw.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == NOTICE_COOKIE)
        .map(|(_, value)| value.to_string())
}

fn encode_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        let _ = write!(out, "{byte:02x}");
    }
    out
}

fn decode_hex(raw: &str) -> Option<Vec<u8>> {
    if raw.len() % 2 != 0 || !raw.is_ascii() {
        return None;
    }
    (0..raw.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&raw[i..i + 2], 16).ok())
        .collect()
}
