const PERFORMANCE_WAGE: (&str, &str) = ("绩效工资", "基础性绩效");

// First match wins within this group
const MEDICAL_INSURANCE: [(&str, &str); 3] = [
    ("行政医疗", "职工基本医疗（行政）"),
    ("事业医疗", "基本医疗（事业）"),
    ("医疗保险", "基本医疗"),
];

/// Maps a raw wage-category label onto the name the template uses for it.
///
/// A label containing a known term becomes that term's canonical name;
/// anything else passes through trimmed. None of the canonical names contain a
/// source term, so normalizing twice changes nothing.
pub fn normalize(label: &str) -> String {
    let label = label.trim();

    if label.contains(PERFORMANCE_WAGE.0) {
        return PERFORMANCE_WAGE.1.to_string();
    }

    MEDICAL_INSURANCE
        .iter()
        .find(|(term, _)| label.contains(term))
        .map_or_else(|| label.to_string(), |(_, canonical)| canonical.to_string())
}
