//! Process presence checks

use std::process::Command;
use sysinfo::System;

/// Check if a process with the given name is running
pub fn is_running(name: &str) -> bool {
    !find_pids(name).is_empty()
}

/// Get PIDs of processes matching a name
pub fn find_pids(name: &str) -> Vec<u32> {
    let mut sys = System::new();
    sys.refresh_processes(sysinfo::ProcessesToUpdate::All, true);

    let mut pids: Vec<u32> = sys
        .processes()
        .iter()
        .filter(|(_, p)| {
            p.name().to_string_lossy().contains(name)
                || p.cmd().iter().any(|arg| arg.to_string_lossy().contains(name))
        })
        .map(|(pid, _)| pid.as_u32())
        .collect();

    // Fallback: pgrep sees app bundles sysinfo sometimes misses on macOS
    #[cfg(unix)]
    if pids.is_empty() {
        if let Ok(output) = Command::new("pgrep").args(["-f", name]).output() {
            if output.status.success() {
                let stdout = String::from_utf8_lossy(&output.stdout);
                for line in stdout.lines() {
                    if let Ok(pid) = line.trim().parse::<u32>() {
                        pids.push(pid);
                    }
                }
            }
        }
    }

    pids.sort_unstable();
    pids.dedup();
    pids
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_process_is_not_running() {
        assert!(!is_running("raycast-mcp-no-such-process-0b9c1e"));
    }
}
