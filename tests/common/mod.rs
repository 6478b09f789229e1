// Common test utilities

#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

pub const HOSTS: &str = "\
sw1:
  hostname: 172.16.10.11
  groups:
    - cisco_switch
  data:
    site: lab
R1:
  hostname: 172.16.10.12
  groups:
    - cisco_router
  data:
    ntp: 10.0.0.123
sw2:
  hostname: 172.16.10.13
  groups:
    - cisco_switch
";

pub const GROUPS: &str = "\
cisco:
  platform: ios
  data:
    vendor: cisco
    ntp: 1.1.1.1
cisco_switch:
  groups:
    - cisco
  data:
    role: access
cisco_router:
  groups:
    - cisco
  platform: iosxe
";

pub const DEFAULTS: &str = "\
username: admin
password: cisco
data:
  domain: example.net
  ntp: 0.pool.ntp.org
";

/// A temp directory holding the lab inventory and a config file pointing at it.
pub struct Lab {
    pub dir: TempDir,
    pub config_path: PathBuf,
}

pub fn lab(config: &str) -> Lab {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("inventory")).unwrap();
    fs::write(dir.path().join("inventory/hosts.yaml"), HOSTS).unwrap();
    fs::write(dir.path().join("inventory/groups.yaml"), GROUPS).unwrap();
    fs::write(dir.path().join("inventory/defaults.yaml"), DEFAULTS).unwrap();
    let config_path = dir.path().join("config.yaml");
    fs::write(&config_path, config).unwrap();
    Lab { dir, config_path }
}

pub const CONFIG: &str = "\
inventory:
  plugin: SimpleInventory
  options:
    host_file: inventory/hosts.yaml
    group_file: inventory/groups.yaml
    defaults_file: inventory/defaults.yaml
runner:
  plugin: threaded
  options:
    num_workers: 4
";
