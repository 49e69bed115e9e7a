// School categories and their workbook column layouts
//
// Everything category-dependent lives here as data: column indices,
// header labels, column widths, sheet names, download filenames.
// Adding a category is a table change, not a logic change.

use serde::{Deserialize, Serialize};

/// School category selection. Wire names match the original tool
/// (`kinder` / `ele` / `mid`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchoolCategory {
    /// Kindergarten / daycare (유치원·어린이집)
    Kinder,
    /// Elementary school (초등학교)
    Ele,
    /// Middle / high school (중·고등학교)
    Mid,
}

/// Column roles mapped to zero-based sheet column indices.
///
/// `result_in` is where the reader looks for a pre-existing result in an
/// uploaded file; `result_out` is where the writer places the generated
/// result. The two differ by one column — an asymmetry inherited from the
/// original service and kept so uploaded result files round-trip the way
/// users expect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnLayout {
    pub number: usize,
    pub characteristics: usize,
    pub activity: Option<usize>,
    pub result_in: usize,
    pub result_out: usize,
}

impl ColumnLayout {
    /// Columns probed by the blank-row termination check (0–2 for every
    /// category).
    pub const EMPTY_PROBE_COLS: std::ops::Range<usize> = 0..3;

    /// Input columns: the ones a user fills in before upload
    /// (number, characteristics, and activity for kindergarten).
    pub fn input_cols(&self) -> Vec<usize> {
        let mut cols = vec![self.number, self.characteristics];
        if let Some(activity) = self.activity {
            cols.push(activity);
        }
        cols
    }

    /// Highest column index the writer touches (for the used range).
    pub fn last_out_col(&self) -> usize {
        self.result_out
    }
}

const KINDER_LAYOUT: ColumnLayout = ColumnLayout {
    number: 0,
    characteristics: 1,
    activity: Some(2),
    result_in: 4,
    result_out: 3,
};

const SCHOOL_LAYOUT: ColumnLayout = ColumnLayout {
    number: 0,
    characteristics: 1,
    activity: None,
    result_in: 3,
    result_out: 2,
};

impl SchoolCategory {
    pub const ALL: [SchoolCategory; 3] =
        [SchoolCategory::Kinder, SchoolCategory::Ele, SchoolCategory::Mid];

    pub fn as_str(&self) -> &'static str {
        match self {
            SchoolCategory::Kinder => "kinder",
            SchoolCategory::Ele => "ele",
            SchoolCategory::Mid => "mid",
        }
    }

    pub fn layout(&self) -> ColumnLayout {
        match self {
            SchoolCategory::Kinder => KINDER_LAYOUT,
            SchoolCategory::Ele | SchoolCategory::Mid => SCHOOL_LAYOUT,
        }
    }

    /// Header label for the characteristics column
    /// (유아특성 for kindergarten, 학생특성 otherwise).
    pub fn characteristics_label(&self) -> &'static str {
        match self {
            SchoolCategory::Kinder => "유아특성",
            SchoolCategory::Ele | SchoolCategory::Mid => "학생특성",
        }
    }

    /// Header labels for the input columns, in column order.
    pub fn input_headers(&self) -> Vec<&'static str> {
        match self {
            SchoolCategory::Kinder => vec!["번호", "유아특성", "놀이활동"],
            SchoolCategory::Ele | SchoolCategory::Mid => vec!["번호", "학생특성"],
        }
    }

    /// Header labels for a results file: input headers plus 생성결과.
    pub fn result_headers(&self) -> Vec<&'static str> {
        let mut headers = self.input_headers();
        headers.push("생성결과");
        headers
    }

    /// Default column widths (Excel character units) for the input
    /// columns: 10 for 번호, 50 for the text columns.
    pub fn input_col_widths(&self) -> Vec<f64> {
        match self {
            SchoolCategory::Kinder => vec![10.0, 50.0, 50.0],
            SchoolCategory::Ele | SchoolCategory::Mid => vec![10.0, 50.0],
        }
    }

    /// Default column widths for a results file (80 for 생성결과).
    pub fn result_col_widths(&self) -> Vec<f64> {
        let mut widths = self.input_col_widths();
        widths.push(80.0);
        widths
    }

    /// Sheet name used when no source workbook supplies one.
    pub fn sheet_name(&self) -> &'static str {
        match self {
            SchoolCategory::Kinder => "유아 행동발달상황",
            SchoolCategory::Ele | SchoolCategory::Mid => "행동특성 및 종합의견",
        }
    }

    /// Filename for the generated results workbook.
    pub fn results_filename(&self) -> &'static str {
        match self {
            SchoolCategory::Kinder => "유아행동발달사항.xlsx",
            SchoolCategory::Ele | SchoolCategory::Mid => "행발생성결과.xlsx",
        }
    }

    /// Filename for the blank input template (category-independent).
    pub fn template_filename() -> &'static str {
        "행발입력자료.xlsx"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_kinder_has_activity() {
        let layout = SchoolCategory::Kinder.layout();
        assert_eq!(layout.activity, Some(2));
        assert_eq!(layout.result_in, 4);
        assert_eq!(layout.result_out, 3);
        assert_eq!(layout.input_cols(), vec![0, 1, 2]);
    }

    #[test]
    fn test_layout_school_has_no_activity() {
        for cat in [SchoolCategory::Ele, SchoolCategory::Mid] {
            let layout = cat.layout();
            assert_eq!(layout.activity, None);
            assert_eq!(layout.result_in, 3);
            assert_eq!(layout.result_out, 2);
            assert_eq!(layout.input_cols(), vec![0, 1]);
        }
    }

    #[test]
    fn test_result_headers() {
        assert_eq!(
            SchoolCategory::Kinder.result_headers(),
            vec!["번호", "유아특성", "놀이활동", "생성결과"]
        );
        assert_eq!(
            SchoolCategory::Ele.result_headers(),
            vec!["번호", "학생특성", "생성결과"]
        );
    }

    #[test]
    fn test_widths_match_headers() {
        for cat in SchoolCategory::ALL {
            assert_eq!(cat.input_headers().len(), cat.input_col_widths().len());
            assert_eq!(cat.result_headers().len(), cat.result_col_widths().len());
        }
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(SchoolCategory::Kinder.as_str(), "kinder");
        assert_eq!(SchoolCategory::Ele.as_str(), "ele");
        assert_eq!(SchoolCategory::Mid.as_str(), "mid");
    }
}
