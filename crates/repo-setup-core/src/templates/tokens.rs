use std::borrow::Cow;

use crate::project::ProjectInfo;

/// A recognized placeholder marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    Repository,
    ProjectName,
    ProjectShortDescription,
    ProjectLongDescription,
    DocsUrl,
    Email,
    Username,
    Name,
}

impl Token {
    /// Every token, in the order they are tried at a given position.
    pub const ALL: [Token; 8] = [
        Token::Repository,
        Token::ProjectName,
        Token::ProjectShortDescription,
        Token::ProjectLongDescription,
        Token::DocsUrl,
        Token::Email,
        Token::Username,
        Token::Name,
    ];

    /// Shared prefix of every marker.
    pub const OPEN: &'static str = "{{";

    pub fn marker(self) -> &'static str {
        match self {
            Self::Repository => "{{REPOSITORY}}",
            Self::ProjectName => "{{PROJECT_NAME}}",
            Self::ProjectShortDescription => "{{PROJECT_SHORT_DESCRIPTION}}",
            Self::ProjectLongDescription => "{{PROJECT_LONG_DESCRIPTION}}",
            Self::DocsUrl => "{{DOCS_URL}}",
            Self::Email => "{{EMAIL}}",
            Self::Username => "{{USERNAME}}",
            Self::Name => "{{NAME}}",
        }
    }

    pub fn value(self, info: &ProjectInfo) -> Cow<'_, str> {
        match self {
            Self::Repository => Cow::Owned(info.repository_slug()),
            Self::ProjectName => Cow::Borrowed(&info.project_name),
            Self::ProjectShortDescription => Cow::Borrowed(&info.short_description),
            Self::ProjectLongDescription => Cow::Borrowed(&info.long_description),
            Self::DocsUrl => Cow::Borrowed(&info.docs_url),
            Self::Email => Cow::Borrowed(&info.email),
            Self::Username => Cow::Borrowed(&info.username),
            Self::Name => Cow::Borrowed(&info.name),
        }
    }

    /// The token whose marker starts `text`, if any.
    pub fn at_start_of(text: &[u8]) -> Option<Token> {
        Self::ALL
            .into_iter()
            .find(|token| text.starts_with(token.marker().as_bytes()))
    }
}
