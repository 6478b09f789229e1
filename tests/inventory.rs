mod common;

use netrun::{Filter, Inventory, Netrun, NetrunError};

fn lab_inventory() -> Inventory {
    Inventory::from_yaml_str(common::HOSTS, common::GROUPS, common::DEFAULTS).unwrap()
}

#[test]
fn test_precedence_host_then_groups_then_defaults() {
    let inv = lab_inventory();

    // host data wins
    let r1 = inv.get_host("R1").unwrap();
    assert_eq!(inv.resolve_attribute(r1, "ntp").and_then(|v| v.as_str()), Some("10.0.0.123"));

    // then the group chain, child before parent
    let sw1 = inv.get_host("sw1").unwrap();
    assert_eq!(sw1.get("ntp").and_then(|v| v.as_str()), Some("1.1.1.1"));
    assert_eq!(sw1.get("role").and_then(|v| v.as_str()), Some("access"));
    assert_eq!(sw1.get("vendor").and_then(|v| v.as_str()), Some("cisco"));

    // then the defaults
    assert_eq!(sw1.get("domain").and_then(|v| v.as_str()), Some("example.net"));
    assert_eq!(sw1.username(), Some("admin"));
    assert_eq!(sw1.password(), Some("cisco"));

    // absent is None
    assert!(sw1.get("nope").is_none());
}

#[test]
fn test_connection_attributes_inherit() {
    let inv = lab_inventory();
    assert_eq!(inv.get_host("sw1").unwrap().platform(), Some("ios"));
    assert_eq!(inv.get_host("R1").unwrap().platform(), Some("iosxe"));
    assert_eq!(inv.get_host("R1").unwrap().hostname(), "172.16.10.12");
    assert_eq!(inv.get_host("R1").unwrap().port(), None);
}

#[test]
fn test_extended_groups() {
    let inv = lab_inventory();
    let sw1 = inv.get_host("sw1").unwrap();
    assert_eq!(sw1.get_group_names(), vec!["cisco_switch"]);
    assert_eq!(sw1.get_extended_group_names(), vec!["cisco_switch", "cisco"]);
    assert!(sw1.has_parent_group("cisco"));
    assert!(!sw1.has_parent_group("cisco_router"));

    let cisco_switch = inv.get_group("cisco_switch").unwrap();
    assert!(cisco_switch.has_ancestor_group("cisco"));
    assert!(!cisco_switch.has_ancestor_group("cisco_router"));
    assert!(!inv.get_group("cisco").unwrap().has_ancestor_group("cisco"));

    let names : Vec<String> = inv.children_of_group("cisco").iter().map(|h| h.name.clone()).collect();
    assert_eq!(names, vec!["sw1", "R1", "sw2"]);
}

#[test]
fn test_filter_is_monotonic_and_shares_hosts() {
    let inv = lab_inventory();
    let switches = inv.filter_with(&Filter::group("cisco_switch"));
    assert_eq!(switches.host_names(), vec!["sw1", "sw2"]);

    let lab_switches = switches.filter_by("site", "lab");
    assert_eq!(lab_switches.host_names(), vec!["sw1"]);

    // narrowing a view never brings back hosts the parent view dropped
    let everything = switches.filter(|_h| true);
    assert_eq!(everything.host_names(), switches.host_names());

    assert!(std::sync::Arc::ptr_eq(lab_switches.get_host("sw1").unwrap(), inv.get_host("sw1").unwrap()));
    assert!(inv.filter_by("hostname", "10.9.9.9").is_empty());
}

#[test]
fn test_filter_expressions() {
    let inv = lab_inventory();
    let not_routers = inv.filter_with(&(Filter::group("cisco") & !Filter::platform("iosxe")));
    assert_eq!(not_routers.host_names(), vec!["sw1", "sw2"]);

    let either = inv.filter_with(&(Filter::name("sw2") | Filter::hostname("172.16.10.12")));
    assert_eq!(either.host_names(), vec!["R1", "sw2"]);

    let by_regex = inv.filter_with(&Filter::name_regex("^sw[0-9]+$").unwrap());
    assert_eq!(by_regex.len(), 2);
    assert!(matches!(Filter::name_regex("sw[").unwrap_err(), NetrunError::Config(_)));
}

#[test]
fn test_load_through_config_file() {
    let lab = common::lab(common::CONFIG);
    let nr = Netrun::from_config_file(&lab.config_path).unwrap();
    assert_eq!(nr.inventory().len(), 3);
    assert_eq!(nr.runner_name(), "threaded");
    assert_eq!(nr.config().runner.options.num_workers, 4);
}

#[test]
fn test_unknown_plugin_is_a_config_error() {
    let lab = common::lab("inventory:\n  plugin: NetBox\n");
    match Netrun::from_config_file(&lab.config_path) {
        Err(e) => {
            assert!(e.is_config_error());
            assert!(e.to_string().contains("SimpleInventory"));
        },
        Ok(_) => panic!("expected a config error"),
    }
}

#[test]
fn test_to_value_mirrors_sources() {
    let value = lab_inventory().to_value().unwrap();
    assert_eq!(value["hosts"]["sw1"]["hostname"], "172.16.10.11");
    assert_eq!(value["hosts"]["sw1"]["groups"][0], "cisco_switch");
    assert_eq!(value["groups"]["cisco_switch"]["groups"][0], "cisco");
    assert_eq!(value["defaults"]["username"], "admin");
}

#[test]
fn test_debug_lists_names() {
    let inv = lab_inventory();
    let shown = format!("{:?}", inv);
    assert!(shown.starts_with("Inventory"));
    assert!(shown.contains("hosts: [\"sw1\", \"R1\", \"sw2\"]"));
    assert!(shown.contains("\"cisco_router\""));

    let routers = format!("{:?}", inv.filter_by("platform", "iosxe"));
    assert!(routers.contains("hosts: [\"R1\"]"));
}
