#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subject {
    pub code: &'static str,
    pub name: &'static str,
}

pub const SUBJECTS: &[Subject] = &[
    Subject { code: "MLN111", name: "Kỹ năng mềm cơ bản" },
    Subject { code: "MLN122", name: "Giao tiếp hiệu quả" },
    Subject { code: "MLN131", name: "Tư duy phản biện" },
    Subject { code: "HCM202", name: "Lãnh đạo nhóm" },
    Subject { code: "VNR202", name: "Văn hóa doanh nghiệp" },
];

pub fn subject_by_code(code: &str) -> Option<&'static Subject> {
    let code = code.trim();
    SUBJECTS.iter().find(|s| s.code.eq_ignore_ascii_case(code))
}
