use log::debug;
use log::info;
use std::process::Command;
use anyhow::bail;

pub fn check_cmake() -> anyhow::Result<()> {
    debug!("Checking for cmake");
    if let Ok(_output) = Command::new("cmake").arg("--version").output() {
        info!("Found cmake");
        Ok(())
    } else {
        bail!("cmake is either not installed or not in PATH")
    }
}

pub fn check_make() -> anyhow::Result<()> {
    debug!("Checking for make");
    if let Ok(_output) = Command::new("make").arg("--version").output() {
        info!("Found make");
        Ok(())
    } else {
        bail!("make is either not installed or not in PATH")
    }
}

pub fn check_samtools() -> anyhow::Result<()> {
    debug!("Checking for samtools");
    if let Ok(_output) = Command::new("samtools").output() {
        info!("Found samtools");
        Ok(())
    } else {
        bail!("Samtools is either not installed or not in PATH")
    }
}

pub fn check_bwa() -> anyhow::Result<()> {
    debug!("Checking for bwa");
    if let Ok(_output) = Command::new("bwa").output() {
        info!("Found bwa");
        Ok(())
    } else {
        bail!("bwa is either not installed or not in PATH")
    }
}

pub fn check_minimap2() -> anyhow::Result<()> {
    debug!("Checking for minimap2");
    if let Ok(_output) = Command::new("minimap2").output() {
        info!("Found minimap2");
        Ok(())
    } else {
        bail!("minimap2 is either not installed or not in PATH")
    }
}
