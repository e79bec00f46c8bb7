/// 未知状态使用的样式类名
pub const DEFAULT_STATUS_CLASS: &str = "status-default";

// (服务端状态, 显示文本, 样式类名)
const STATUS_TABLE: &[(&str, &str, &str)] = &[
    ("已提交，等待审核", "待审核", "status-pending"),
    ("处理中", "处理中", "status-processing"),
    ("已处理", "已处理", "status-processed"),
    ("已解决", "已解决", "status-resolved"),
    ("已关闭", "已关闭", "status-closed"),
];

fn lookup(status: &str) -> Option<&'static (&'static str, &'static str, &'static str)> {
    STATUS_TABLE.iter().find(|(raw, _, _)| *raw == status)
}

/// 问题状态的显示文本，未知状态原样返回
pub fn status_display_text(status: &str) -> &str {
    lookup(status).map(|(_, text, _)| *text).unwrap_or(status)
}

/// 问题状态对应的样式类名
pub fn status_display_class(status: &str) -> &'static str {
    lookup(status)
        .map(|(_, _, class)| *class)
        .unwrap_or(DEFAULT_STATUS_CLASS)
}
