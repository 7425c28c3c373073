//! Connector families and plug compatibility.

/// Connector families and the names stations and vehicles use for them.
///
/// Matching is by case-insensitive substring, so "CCS Type 2 (Combo)"
/// resolves to the CCS family.
const CONNECTOR_ALIASES: &[(&str, &[&str])] = &[
    ("CCS Type 2", &["CCS Type 2", "CCS", "Combo 2", "CCS2"]),
    ("Type 2", &["Type 2", "Mennekes", "IEC 62196"]),
    ("CHAdeMO", &["CHAdeMO"]),
    ("Tesla", &["Tesla", "Tesla Supercharger"]),
    ("Type 1", &["Type 1", "J1772", "SAE J1772"]),
];

/// Families a connector name belongs to.
fn families(name: &str) -> impl Iterator<Item = &'static str> + '_ {
    let name = name.to_lowercase();
    CONNECTOR_ALIASES
        .iter()
        .filter(move |(_, aliases)| aliases.iter().any(|alias| name.contains(&alias.to_lowercase())))
        .map(|(family, _)| *family)
}

/// Whether a vehicle with `vehicle` inlets can plug into a station with
/// `station` connectors.
///
/// An empty list means the connectors are unknown and anything goes.
///
/// # Examples
///
/// ```
/// use charge_planner::domain::connectors_compatible;
///
/// let vehicle = vec!["CCS2".to_string()];
/// assert!(connectors_compatible(&vehicle, &["Combo 2".to_string()]));
/// assert!(!connectors_compatible(&vehicle, &["CHAdeMO".to_string()]));
/// assert!(connectors_compatible(&vehicle, &[]));
/// ```
pub fn connectors_compatible(vehicle: &[String], station: &[String]) -> bool {
    if vehicle.is_empty() || station.is_empty() {
        return true;
    }
    vehicle.iter().any(|inlet| {
        families(inlet).any(|family| station.iter().any(|plug| families(plug).any(|f| f == family)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn aliases_resolve() {
        assert_eq!(families("mennekes").collect::<Vec<_>>(), vec!["Type 2"]);
        assert_eq!(families("SAE J1772").collect::<Vec<_>>(), vec!["Type 1"]);
        assert_eq!(families("Schuko").count(), 0);
    }

    #[test]
    fn ccs_vehicle() {
        let vehicle = names(&["CCS Type 2", "Type 2"]);
        assert!(connectors_compatible(&vehicle, &names(&["CCS"])));
        assert!(connectors_compatible(&vehicle, &names(&["Mennekes"])));
        assert!(!connectors_compatible(&vehicle, &names(&["CHAdeMO"])));
        assert!(!connectors_compatible(&vehicle, &names(&["Schuko"])));
    }

    #[test]
    fn chademo_vehicle() {
        let vehicle = names(&["CHAdeMO"]);
        assert!(connectors_compatible(&vehicle, &names(&["CCS2", "chademo"])));
        assert!(!connectors_compatible(&vehicle, &names(&["Tesla Supercharger"])));
    }

    #[test]
    fn unknown_is_compatible() {
        assert!(connectors_compatible(&[], &names(&["CHAdeMO"])));
        assert!(connectors_compatible(&names(&["CCS2"]), &[]));
    }
}
