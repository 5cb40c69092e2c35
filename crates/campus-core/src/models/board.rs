use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Portal user role, used to decide which boards accept new posts.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Student,
    Professor,
    Staff,
}

/// Board categories exposed by the backend.
///
/// Every kind shares the same list/detail handling and differs only by its
/// [`BoardConfig`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum BoardKind {
    Notice,
    Department,
    Career,
    Student,
    Professor,
}

impl BoardKind {
    pub const ALL: [BoardKind; 5] = [
        BoardKind::Notice,
        BoardKind::Department,
        BoardKind::Career,
        BoardKind::Student,
        BoardKind::Professor,
    ];

    pub fn config(&self) -> &'static BoardConfig {
        match self {
            BoardKind::Notice => &NOTICE_BOARD,
            BoardKind::Department => &DEPARTMENT_BOARD,
            BoardKind::Career => &CAREER_BOARD,
            BoardKind::Student => &STUDENT_BOARD,
            BoardKind::Professor => &PROFESSOR_BOARD,
        }
    }
}

impl Display for BoardKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.config().segment)
    }
}

impl FromStr for BoardKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "notice" | "notices" => Ok(BoardKind::Notice),
            "department" | "dept" => Ok(BoardKind::Department),
            "career" | "careers" => Ok(BoardKind::Career),
            "student" | "students" => Ok(BoardKind::Student),
            "professor" | "professors" => Ok(BoardKind::Professor),
            _ => Err(anyhow::anyhow!("Invalid board type: {}", s)),
        }
    }
}

/// Static configuration for one board type.
#[derive(Debug, PartialEq, Eq)]
pub struct BoardConfig {
    pub kind: BoardKind,
    /// Path segment under the API prefix, e.g. `notice` -> `/api/v1/boards/notice`.
    pub segment: &'static str,
    pub title: &'static str,
    /// Topic labels offered by the hashtag filter. Empty means no filter.
    pub hashtags: &'static [&'static str],
    pub writable_by: &'static [Role],
}

impl BoardConfig {
    pub fn supports_hashtags(&self) -> bool {
        !self.hashtags.is_empty()
    }

    pub fn can_write(&self, role: Role) -> bool {
        self.writable_by.contains(&role)
    }
}

static NOTICE_BOARD: BoardConfig = BoardConfig {
    kind: BoardKind::Notice,
    segment: "notice",
    title: "공지사항",
    hashtags: &["학사", "장학", "행사", "시설"],
    writable_by: &[Role::Staff],
};

static DEPARTMENT_BOARD: BoardConfig = BoardConfig {
    kind: BoardKind::Department,
    segment: "department",
    title: "학과 게시판",
    hashtags: &[],
    writable_by: &[Role::Professor, Role::Staff],
};

static CAREER_BOARD: BoardConfig = BoardConfig {
    kind: BoardKind::Career,
    segment: "career",
    title: "취업/진로",
    hashtags: &["채용", "인턴", "공모전", "설명회"],
    writable_by: &[Role::Staff],
};

static STUDENT_BOARD: BoardConfig = BoardConfig {
    kind: BoardKind::Student,
    segment: "student",
    title: "학생 게시판",
    hashtags: &["질문", "스터디", "자유"],
    writable_by: &[Role::Student],
};

static PROFESSOR_BOARD: BoardConfig = BoardConfig {
    kind: BoardKind::Professor,
    segment: "professor",
    title: "교수 게시판",
    hashtags: &[],
    writable_by: &[Role::Professor],
};
