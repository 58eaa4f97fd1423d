/// Render a byte count as a compact human-readable size.
///
/// Divides by 1024 through `B`, `KB`, `MB` and `GB`, printing one decimal
/// place, and falls through to `TB` for anything larger.
pub fn format_size(bytes: u64) -> String {
    let mut size = bytes as f64;
    for unit in ["", "K", "M", "G"] {
        if size < 1024.0 {
            return format!("{size:.1}{unit}B");
        }
        size /= 1024.0;
    }
    format!("{size:.1}TB")
}
