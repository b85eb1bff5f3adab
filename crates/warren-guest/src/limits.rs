/// Kernel resource limits applied to a guest process at startup. Defaults
/// match the small constants a cooperative-guest interpreter needs and
/// nothing more: 4MB address space and data segment, 8MB stack, no core
/// dumps, no file writes, one second of CPU time, three open descriptors.
#[derive(Debug, Clone, Copy)]
pub struct GuestLimits {
    pub address_space: u64,
    pub core: u64,
    pub cpu_seconds: u64,
    pub data: u64,
    pub file_size: u64,
    pub open_files: u64,
    pub stack: u64,
}

impl Default for GuestLimits {
    fn default() -> Self {
        Self {
            address_space: 1 << 22,
            core: 0,
            cpu_seconds: 1,
            data: 1 << 22,
            file_size: 0,
            open_files: 3,
            stack: 1 << 23,
        }
    }
}

impl GuestLimits {
    /// Limits loose enough that the test harness itself (and its async
    /// runtime) can run under them. Used by tests, never by a real guest.
    pub fn relaxed() -> Self {
        Self {
            address_space: 1 << 30,
            core: 0,
            cpu_seconds: 60,
            data: 1 << 30,
            file_size: 1 << 20,
            open_files: 256,
            stack: 1 << 24,
        }
    }

    #[cfg(unix)]
    pub fn apply(&self) -> std::io::Result<()> {
        use rlimit::Resource;

        Resource::AS.set(self.address_space, self.address_space)?;
        Resource::CORE.set(self.core, self.core)?;
        Resource::CPU.set(self.cpu_seconds, self.cpu_seconds)?;
        Resource::DATA.set(self.data, self.data)?;
        Resource::FSIZE.set(self.file_size, self.file_size)?;
        Resource::NOFILE.set(self.open_files, self.open_files)?;
        Resource::STACK.set(self.stack, self.stack)?;
        Ok(())
    }

    #[cfg(not(unix))]
    pub fn apply(&self) -> std::io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_design_constants() {
        let limits = GuestLimits::default();
        assert_eq!(limits.address_space, 4 * 1024 * 1024);
        assert_eq!(limits.stack, 8 * 1024 * 1024);
        assert_eq!(limits.core, 0);
        assert_eq!(limits.open_files, 3);
    }

    #[cfg(unix)]
    #[test]
    fn relaxed_limits_apply_without_error() {
        GuestLimits::relaxed().apply().unwrap();
    }
}
