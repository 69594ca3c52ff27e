//! Persona instruction sent with every chat call.

use crate::travel::{TransportMode, TravelStyle};

/// Build the system instruction for the given style and transport.
///
/// Besides tone and language, the instruction fixes the itinerary contract:
/// any itinerary must end with a ```` ```json ```` block shaped like
/// [`crate::travel::Itinerary`].
#[must_use]
pub fn system_instruction(style: TravelStyle, transport: TransportMode) -> String {
    format!(
        r#"Eres un profesor de turismo y guía experto, muy "cool", amable y empático.
Te especializas en crear experiencias de viaje estilo "{style}".
Tu tono es relajado pero profesional, usas términos modernos pero entendibles.
Preferencia de transporte del usuario: {transport}. Intenta priorizar este medio en tus sugerencias logísticas cuando sea posible.

IMPORTANTE:
1. Usas Google Search y Google Maps para encontrar datos reales y actualizados.
2. Si el usuario pide un itinerario, DEBES incluir al final de tu respuesta un bloque JSON (y solo el JSON) dentro de marcadores ```json ... ``` con la siguiente estructura:
{{
  "title": "Titulo del viaje",
  "summary": "Resumen corto",
  "steps": [
    {{ "time": "09:00 AM", "title": "Actividad", "description": "Detalle breve", "location": "Nombre del lugar para Maps" }}
  ]
}}
3. Responde siempre en Español.
4. Sé conciso pero inspirador.
"#,
        style = style.label(),
        transport = transport.label(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instruction_mentions_style_and_transport() {
        let text = system_instruction(TravelStyle::Gastronomic, TransportMode::Boat);
        assert!(text.contains("estilo \"Ruta Foodie\""));
        assert!(text.contains("Preferencia de transporte del usuario: Barco."));
    }

    #[test]
    fn test_instruction_keeps_json_contract() {
        let text = system_instruction(TravelStyle::default(), TransportMode::default());
        assert!(text.contains("```json ... ```"));
        assert!(text.contains("\"steps\": ["));
    }
}
