//! Rule-based estimation of emission features from a purchase amount.
//!
//! Used when the evidence carries only a monetary amount plus an action
//! descriptor (receipt line items, detected labels). The rules encode
//! typical Kenyan equipment prices and usage patterns per sector.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::emissions::calculator::EmissionFeatures;

/// Estimate emission features from a monetary amount (KES) and an action
/// descriptor. Unknown sector/action combinations yield empty features.
pub fn estimate_features(amount_ksh: Decimal, sector: &str, action_type: &str) -> EmissionFeatures {
    let action = action_type.to_lowercase();
    let mut features = EmissionFeatures::default();

    match sector.to_lowercase().as_str() {
        "salon" => {
            if action.contains("led") || action.contains("light") {
                // ~KES 400 per LED bulb; 10 W saving, 8 h/day, 30 days
                let bulbs = (amount_ksh / dec!(400)).max(Decimal::ONE);
                features.kwh_saved = Some(bulbs * dec!(0.01) * dec!(8) * dec!(30));
            } else if action.contains("solar") {
                // Small solar system: ~KES 50,000 per kW; 4 sun hours, 30 days
                let kw_capacity = amount_ksh / dec!(50000);
                features.solar_kwh_generated = Some(kw_capacity * dec!(4) * dec!(30));
            }
        }
        "farmer" => {
            if action.contains("solar") && action.contains("pump") {
                // Solar pump: ~KES 80,000 per kW; 6 h/day, 30 days
                let pump_size_kw = amount_ksh / dec!(80000);
                features.solar_kwh_generated = Some(pump_size_kw * dec!(6) * dec!(30));
                features.water_m3_saved = Some(pump_size_kw * dec!(100));
            } else if action.contains("drip") {
                // Drip irrigation: ~KES 15,000 per hectare, 500 m3 saved each
                let area_hectares = amount_ksh / dec!(15000);
                features.water_m3_saved = Some(area_hectares * dec!(500));
            }
        }
        "welding" => {
            if action.contains("solar") {
                // Workshop solar: ~KES 60,000 per kW; 5 h/day, 25 days
                let kw_capacity = amount_ksh / dec!(60000);
                features.solar_kwh_generated = Some(kw_capacity * dec!(5) * dec!(25));
            } else if action.contains("inverter") {
                // Inverter welder: ~KES 100,000 per kW; 2 kW saving, 8 h, 25 days
                let power_rating_kw = amount_ksh / dec!(100000);
                features.appliance_efficiency_gain =
                    Some(power_rating_kw * dec!(2) * dec!(8) * dec!(25));
            }
        }
        _ => {}
    }

    features
}
