//! The closed intent grammar: one variant per action tag.
//!
//! The classifier speaks a line-oriented wire format (`TAG` or `TAG:payload`
//! with `|`-delimited positional fields). Parsing that format into this sum
//! type is the single enforcement point for the grammar: a known tag with a
//! malformed payload is a parse error, while text matching no tag at all
//! becomes [`Intent::RawCommand`] — the deliberate escape hatch, not a bug.

use std::fmt;

use miette::Diagnostic;
use thiserror::Error;

/// Errors from parsing a resolved intent line.
///
/// These never escape the dispatcher as panics; they become failure-status
/// results so the pipeline keeps accepting utterances.
#[derive(Debug, Error, Diagnostic)]
pub enum IntentParseError {
    #[error("invalid {tag} format: expected {expected} field(s), got {actual}")]
    #[diagnostic(
        code(atlas::intent::bad_arity),
        help("Payload fields are separated by '|'. Example: EMAIL:to@example.com|subject|body")
    )]
    BadArity {
        tag: String,
        expected: usize,
        actual: usize,
    },

    #[error("{tag} requires a payload")]
    #[diagnostic(
        code(atlas::intent::missing_payload),
        help("Write the tag as TAG:<payload>, e.g. GOOGLE:rust tutorials")
    )]
    MissingPayload { tag: String },

    #[error("invalid volume level: {payload}")]
    #[diagnostic(
        code(atlas::intent::invalid_volume),
        help("SET_VOLUME takes an integer percentage between 0 and 100.")
    )]
    InvalidVolume { payload: String },
}

/// A resolved, dispatchable intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Generate code or a website from a description.
    Codegen(String),
    /// Solve a math/aptitude/logic question with step justification.
    Solve(String),
    /// Current weather for the user's IP-derived location.
    Weather,
    /// Capture the screen to a timestamped file.
    Screenshot,
    /// Send a WhatsApp message.
    Whatsapp { contact: String, message: String },
    /// Start a WhatsApp audio call.
    WhatsappCall(String),
    /// Start a WhatsApp video call.
    WhatsappVideoCall(String),
    /// Send an email.
    Email {
        to: String,
        subject: String,
        body: String,
    },
    /// Open a Google search in the browser.
    Google(String),
    /// Open a YouTube search in the browser.
    Youtube(String),
    /// Resolve the first matching video and play it.
    YtPlay(String),
    /// Center the Maps app on the current location.
    MapsFindMe,
    /// Mute system audio output.
    MuteSound,
    /// Unmute system audio output.
    UnmuteSound,
    /// Set output volume to a percentage (0–100, validated at parse time).
    SetVolume(u8),
    /// Execute the text verbatim as a host shell command.
    ///
    /// The grammar's "otherwise" arm: reachable only after every known tag
    /// has failed to match.
    RawCommand(String),
}

/// Keywords the chat fallback scans for, in priority order. First hit wins,
/// so broader prefixes (e.g. `whatsapp`) deliberately shadow their longer
/// variants, matching the original behavior.
pub const TASK_KEYWORDS: [&str; 15] = [
    "whatsapp",
    "whatsapp_call",
    "whatsapp_video_call",
    "email",
    "google",
    "youtube",
    "ytplay",
    "maps_find_me",
    "screenshot",
    "weather",
    "codegen",
    "solve",
    "mute_sound",
    "unmute_sound",
    "set_volume",
];

/// Payload-bearing tag names, used to reject a bare tag (e.g. `EMAIL` with
/// no colon) instead of letting it fall through to the shell.
const PAYLOAD_TAGS: [&str; 10] = [
    "CODEGEN",
    "SOLVE",
    "WHATSAPP",
    "WHATSAPP_CALL",
    "WHATSAPP_VIDEO_CALL",
    "EMAIL",
    "GOOGLE",
    "YOUTUBE",
    "YTPLAY",
    "SET_VOLUME",
];

impl Intent {
    /// Parse one line of the classifier wire format.
    ///
    /// Unit tags match exactly; payload tags split on `|` with a fixed field
    /// count. Anything else parses to [`Intent::RawCommand`].
    pub fn parse(raw: &str) -> Result<Self, IntentParseError> {
        let line = raw.trim();

        match line {
            "WEATHER" => return Ok(Self::Weather),
            "SCREENSHOT" => return Ok(Self::Screenshot),
            "MAPS_FIND_ME" => return Ok(Self::MapsFindMe),
            "MUTE_SOUND" => return Ok(Self::MuteSound),
            "UNMUTE_SOUND" => return Ok(Self::UnmuteSound),
            _ => {}
        }

        if let Some(payload) = line.strip_prefix("EMAIL:") {
            let fields: Vec<&str> = payload.splitn(3, '|').collect();
            if fields.len() != 3 {
                return Err(IntentParseError::BadArity {
                    tag: "EMAIL".into(),
                    expected: 3,
                    actual: fields.len(),
                });
            }
            return Ok(Self::Email {
                to: fields[0].trim().to_string(),
                subject: fields[1].trim().to_string(),
                body: fields[2].trim().to_string(),
            });
        }

        if let Some(payload) = line.strip_prefix("WHATSAPP:") {
            let fields: Vec<&str> = payload.splitn(2, '|').collect();
            if fields.len() != 2 {
                return Err(IntentParseError::BadArity {
                    tag: "WHATSAPP".into(),
                    expected: 2,
                    actual: fields.len(),
                });
            }
            return Ok(Self::Whatsapp {
                contact: fields[0].trim().to_string(),
                message: fields[1].trim().to_string(),
            });
        }

        if let Some(payload) = line.strip_prefix("SET_VOLUME:") {
            let payload = payload.trim();
            return match payload.parse::<u8>() {
                Ok(pct) if pct <= 100 => Ok(Self::SetVolume(pct)),
                _ => Err(IntentParseError::InvalidVolume {
                    payload: payload.to_string(),
                }),
            };
        }

        // Single-payload tags. WHATSAPP_VIDEO_CALL before WHATSAPP_CALL is
        // not needed since prefixes include the colon, but keep the longer
        // tag first for clarity.
        for (tag, make) in [
            ("WHATSAPP_VIDEO_CALL:", Self::WhatsappVideoCall as fn(String) -> Self),
            ("WHATSAPP_CALL:", Self::WhatsappCall),
            ("CODEGEN:", Self::Codegen),
            ("SOLVE:", Self::Solve),
            ("GOOGLE:", Self::Google),
            ("YOUTUBE:", Self::Youtube),
            ("YTPLAY:", Self::YtPlay),
        ] {
            if let Some(payload) = line.strip_prefix(tag) {
                let payload = payload.trim();
                if payload.is_empty() {
                    return Err(IntentParseError::MissingPayload {
                        tag: tag.trim_end_matches(':').to_string(),
                    });
                }
                return Ok(make(payload.to_string()));
            }
        }

        // A bare payload-bearing tag is an error, not a shell command: the
        // classifier omitted required fields.
        if PAYLOAD_TAGS.contains(&line) {
            return Err(IntentParseError::MissingPayload {
                tag: line.to_string(),
            });
        }

        Ok(Self::RawCommand(line.to_string()))
    }

    /// The tag name of this intent.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Codegen(_) => "CODEGEN",
            Self::Solve(_) => "SOLVE",
            Self::Weather => "WEATHER",
            Self::Screenshot => "SCREENSHOT",
            Self::Whatsapp { .. } => "WHATSAPP",
            Self::WhatsappCall(_) => "WHATSAPP_CALL",
            Self::WhatsappVideoCall(_) => "WHATSAPP_VIDEO_CALL",
            Self::Email { .. } => "EMAIL",
            Self::Google(_) => "GOOGLE",
            Self::Youtube(_) => "YOUTUBE",
            Self::YtPlay(_) => "YTPLAY",
            Self::MapsFindMe => "MAPS_FIND_ME",
            Self::MuteSound => "MUTE_SOUND",
            Self::UnmuteSound => "UNMUTE_SOUND",
            Self::SetVolume(_) => "SET_VOLUME",
            Self::RawCommand(_) => "RAW",
        }
    }

    /// Scan a lowercase query for the first task keyword it contains.
    ///
    /// Used by the chat fallback to offer a secondary action; this is a
    /// heuristic substring scan, not a second classifier pass.
    pub fn scan_keyword(query: &str) -> Option<&'static str> {
        let lower = query.to_lowercase();
        TASK_KEYWORDS.iter().find(|kw| lower.contains(*kw)).copied()
    }
}

impl fmt::Display for Intent {
    /// Render the wire form back (`EMAIL:a|s|b`). `RawCommand` renders as
    /// the command text itself.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Codegen(q) => write!(f, "CODEGEN:{q}"),
            Self::Solve(q) => write!(f, "SOLVE:{q}"),
            Self::Weather => write!(f, "WEATHER"),
            Self::Screenshot => write!(f, "SCREENSHOT"),
            Self::Whatsapp { contact, message } => write!(f, "WHATSAPP:{contact}|{message}"),
            Self::WhatsappCall(c) => write!(f, "WHATSAPP_CALL:{c}"),
            Self::WhatsappVideoCall(c) => write!(f, "WHATSAPP_VIDEO_CALL:{c}"),
            Self::Email { to, subject, body } => write!(f, "EMAIL:{to}|{subject}|{body}"),
            Self::Google(q) => write!(f, "GOOGLE:{q}"),
            Self::Youtube(q) => write!(f, "YOUTUBE:{q}"),
            Self::YtPlay(q) => write!(f, "YTPLAY:{q}"),
            Self::MapsFindMe => write!(f, "MAPS_FIND_ME"),
            Self::MuteSound => write!(f, "MUTE_SOUND"),
            Self::UnmuteSound => write!(f, "UNMUTE_SOUND"),
            Self::SetVolume(p) => write!(f, "SET_VOLUME:{p}"),
            Self::RawCommand(cmd) => write!(f, "{cmd}"),
        }
    }
}
