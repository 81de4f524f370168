//! Built-in mappings for the dashboard's Dataverse tables.

use std::sync::LazyLock;

use crate::mapping::FieldMapping;

/// Machines (`ac_machines`).
pub static MACHINE_MAPPING: LazyLock<FieldMapping> = LazyLock::new(|| {
    FieldMapping::from_table(
        "ac_machines",
        &[
            ("id", "ac_machineid"),
            ("name", "ac_name"),
            ("status", "ac_status"),
            ("ipAddress", "ac_ipaddress"),
            ("lastSeen", "ac_lastseen"),
            ("description", "ac_description"),
            ("processCount", "ac_processcount"),
            ("cpuUsage", "ac_cpuusage"),
            ("memoryUsage", "ac_memoryusage"),
        ],
    )
});

/// Automation processes (`ac_processes`).
pub static PROCESS_MAPPING: LazyLock<FieldMapping> = LazyLock::new(|| {
    FieldMapping::from_table(
        "ac_processes",
        &[
            ("id", "ac_processid"),
            ("name", "ac_name"),
            ("status", "ac_status"),
            ("machineId", "ac_machineid"),
            ("startTime", "ac_starttime"),
            ("endTime", "ac_endtime"),
            ("duration", "ac_duration"),
            ("description", "ac_description"),
            ("type", "ac_type"),
        ],
    )
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_tables_are_one_to_one() {
        for mapping in [&*MACHINE_MAPPING, &*PROCESS_MAPPING] {
            let rebuilt = FieldMapping::new(mapping.remote_entity(), mapping.fields());
            assert_eq!(rebuilt.unwrap(), *mapping);
        }
    }

    #[test]
    fn test_machine_mapping_columns() {
        assert_eq!(MACHINE_MAPPING.remote_entity(), "ac_machines");
        assert_eq!(MACHINE_MAPPING.remote_column("ipAddress"), Some("ac_ipaddress"));
        assert_eq!(MACHINE_MAPPING.remote_columns().len(), 9);
    }

    #[test]
    fn test_process_mapping_columns() {
        assert_eq!(PROCESS_MAPPING.remote_entity(), "ac_processes");
        assert_eq!(PROCESS_MAPPING.app_field("ac_machineid"), Some("machineId"));
        assert_eq!(PROCESS_MAPPING.remote_column("type"), Some("ac_type"));
    }
}
