// Prompt assembly
//
// Pure text assembly: audience framing for the category, the verbatim
// characteristics (and activity when present), fixed output constraints,
// and the caller-chosen length directive. No length logic, no randomness.

use haengbal_model::{LengthDirective, SchoolCategory};

/// Audience framing line per category.
fn framing(category: SchoolCategory) -> &'static str {
    match category {
        SchoolCategory::Kinder => {
            "다음 유아의 특성과 놀이활동을 바탕으로 유치원 생활기록부의 \
             행동발달상황 평가 문장을 작성해 주세요."
        }
        SchoolCategory::Ele => {
            "다음 학생의 특성을 바탕으로 초등학교 생활기록부의 \
             행동특성 및 종합의견을 작성해 주세요."
        }
        SchoolCategory::Mid => {
            "다음 학생의 특성을 바탕으로 중·고등학교 생활기록부의 \
             행동특성 및 종합의견을 작성해 주세요."
        }
    }
}

/// Fixed output constraints appended to every prompt.
const CONSTRAINTS: &str = "학생 이름 없이 문어체의 서술형 평가 문장으로, \
                           마크다운 없이 하나의 문단으로만 답해 주세요.";

/// Build one self-contained generation request.
/// Deterministic given identical inputs.
pub fn build_prompt(
    category: SchoolCategory,
    characteristics: &str,
    activity: Option<&str>,
    directive: LengthDirective,
) -> String {
    let mut prompt = String::new();
    prompt.push_str(framing(category));
    prompt.push_str("\n\n");

    prompt.push_str(category.characteristics_label());
    prompt.push_str(": ");
    prompt.push_str(characteristics);
    prompt.push('\n');

    if let Some(activity) = activity.filter(|a| !a.is_empty()) {
        prompt.push_str("놀이활동: ");
        prompt.push_str(activity);
        prompt.push('\n');
    }

    prompt.push('\n');
    prompt.push_str(CONSTRAINTS);
    prompt.push(' ');
    prompt.push_str(directive.instruction());
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_contains_characteristics_verbatim() {
        let prompt = build_prompt(
            SchoolCategory::Ele,
            "수업 시간에 발표를 즐긴다",
            None,
            LengthDirective::Moderate,
        );
        assert!(prompt.contains("수업 시간에 발표를 즐긴다"));
        assert!(prompt.contains("학생특성: "));
        assert!(prompt.ends_with(LengthDirective::Moderate.instruction()));
    }

    #[test]
    fn test_prompt_kinder_includes_activity() {
        let prompt = build_prompt(
            SchoolCategory::Kinder,
            "호기심이 많다",
            Some("블록놀이"),
            LengthDirective::Concise,
        );
        assert!(prompt.contains("유아특성: 호기심이 많다"));
        assert!(prompt.contains("놀이활동: 블록놀이"));
    }

    #[test]
    fn test_prompt_empty_activity_is_omitted() {
        let prompt = build_prompt(
            SchoolCategory::Kinder,
            "호기심이 많다",
            Some(""),
            LengthDirective::Concise,
        );
        assert!(!prompt.contains("놀이활동"));
    }

    #[test]
    fn test_prompt_framing_differs_by_category() {
        let make = |cat| build_prompt(cat, "특성", None, LengthDirective::Detailed);
        let kinder = make(SchoolCategory::Kinder);
        let ele = make(SchoolCategory::Ele);
        let mid = make(SchoolCategory::Mid);
        assert_ne!(kinder, ele);
        assert_ne!(ele, mid);
        assert!(kinder.contains("유치원"));
        assert!(ele.contains("초등학교"));
        assert!(mid.contains("중·고등학교"));
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let a = build_prompt(SchoolCategory::Mid, "특성", None, LengthDirective::Detailed);
        let b = build_prompt(SchoolCategory::Mid, "특성", None, LengthDirective::Detailed);
        assert_eq!(a, b);
    }
}
