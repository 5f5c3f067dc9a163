/// Page outcome definitions for tracking crawl progress
///
/// This module defines every way processing of one (url, depth) item can end.
use std::fmt;

/// What happened to one queued URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PageOutcome {
    // ===== Success =====
    /// Page was fetched, decoded and written to disk
    Saved,

    // ===== Policy Skips =====
    /// Item is deeper than the maximum crawl depth
    DepthExceeded,

    /// URL is on a different authority than the start URL
    OffDomain,

    /// URL ends in a known asset extension
    NonHtmlResource,

    /// robots.txt disallows the path
    RobotsDenied,

    /// URL (or canonical path, in locale mode) was already taken
    AlreadyVisited,

    /// URL could not be parsed
    InvalidUrl,

    /// Server sent a non-HTML Content-Type
    ContentMismatch,

    /// The crawl was cancelled before this item finished
    Cancelled,

    // ===== Recoverable Errors =====
    /// Page returned HTTP 404
    DeadLink,

    /// Page returned another non-200 status
    HttpError,

    /// Connection, timeout or body read failure
    Unreachable,

    /// The page could not be written to disk
    WriteFailed,

    /// A locale probe got 403/429/5xx; the canonical path was abandoned
    LocaleAborted,

    /// Neither a preferred locale nor the literal URL exists
    LocaleNotFound,
}

impl PageOutcome {
    /// Every outcome, in reporting order
    pub const ALL: [PageOutcome; 15] = [
        Self::Saved,
        Self::DepthExceeded,
        Self::OffDomain,
        Self::NonHtmlResource,
        Self::RobotsDenied,
        Self::AlreadyVisited,
        Self::InvalidUrl,
        Self::ContentMismatch,
        Self::Cancelled,
        Self::DeadLink,
        Self::HttpError,
        Self::Unreachable,
        Self::WriteFailed,
        Self::LocaleAborted,
        Self::LocaleNotFound,
    ];

    /// Returns true if this represents a successful completion
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Saved)
    }

    /// Returns true if the item was skipped by crawl policy
    pub fn is_skip(&self) -> bool {
        matches!(
            self,
            Self::DepthExceeded
                | Self::OffDomain
                | Self::NonHtmlResource
                | Self::RobotsDenied
                | Self::AlreadyVisited
                | Self::InvalidUrl
                | Self::ContentMismatch
                | Self::Cancelled
        )
    }

    /// Returns true if this represents a (recoverable) error
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Self::DeadLink
                | Self::HttpError
                | Self::Unreachable
                | Self::WriteFailed
                | Self::LocaleAborted
                | Self::LocaleNotFound
        )
    }

    /// Stable snake_case name, used in summaries
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Saved => "saved",
            Self::DepthExceeded => "depth_exceeded",
            Self::OffDomain => "off_domain",
            Self::NonHtmlResource => "non_html_resource",
            Self::RobotsDenied => "robots_denied",
            Self::AlreadyVisited => "already_visited",
            Self::InvalidUrl => "invalid_url",
            Self::ContentMismatch => "content_mismatch",
            Self::Cancelled => "cancelled",
            Self::DeadLink => "dead_link",
            Self::HttpError => "http_error",
            Self::Unreachable => "unreachable",
            Self::WriteFailed => "write_failed",
            Self::LocaleAborted => "locale_aborted",
            Self::LocaleNotFound => "locale_not_found",
        }
    }
}

impl fmt::Display for PageOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Saved => "Saved",
            Self::DepthExceeded => "Depth Exceeded",
            Self::OffDomain => "Off Domain",
            Self::NonHtmlResource => "Non-HTML Resource",
            Self::RobotsDenied => "Robots Denied",
            Self::AlreadyVisited => "Already Visited",
            Self::InvalidUrl => "Invalid URL",
            Self::ContentMismatch => "Content Mismatch",
            Self::Cancelled => "Cancelled",
            Self::DeadLink => "Dead Link",
            Self::HttpError => "HTTP Error",
            Self::Unreachable => "Unreachable",
            Self::WriteFailed => "Write Failed",
            Self::LocaleAborted => "Locale Aborted",
            Self::LocaleNotFound => "Locale Not Found",
        };
        write!(f, "{}", label)
    }
}
