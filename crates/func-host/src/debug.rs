//! Sondeo de debugger adjunto al proceso.

/// `true` si un tracer (gdb, lldb, rr...) está adjunto al proceso actual.
/// Fuera de Linux no hay sondeo: siempre `false`.
#[cfg(target_os = "linux")]
pub fn debugger_attached() -> bool {
    std::fs::read_to_string("/proc/self/status").map(|status| tracer_pid(&status).is_some_and(|pid| pid != 0))
                                                 .unwrap_or(false)
}

#[cfg(not(target_os = "linux"))]
pub fn debugger_attached() -> bool {
    false
}

#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn tracer_pid(status: &str) -> Option<u32> {
    status.lines()
          .find_map(|line| line.strip_prefix("TracerPid:"))
          .and_then(|v| v.trim().parse().ok())
}
