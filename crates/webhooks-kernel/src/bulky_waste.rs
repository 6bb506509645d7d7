use serde_json::Value;

use crate::materials::{self, Group, Material};
use crate::params::{capitalize, number, quantity_label, ParamError, ParamsExt, SessionParameters};

/// Largest (small, large, special) item mixes a single removal may contain.
/// A request is valid while its per-group item counts fit under at least one of them.
pub const ALLOWED_COMBINATIONS: &[[u32; 3]] = &[[5, 2, 0], [3, 0, 1], [0, 1, 1]];

const ADDITIONS_HEADER: &str = "Você *ainda pode* adicionar:\n- ";

pub const COLLECT_FIRST_MATERIAL: &str = "Por favor, informe o tipo de material a ser removido e a quantidade de itens\n\nExemplos:\n- 1 geladeira\n- 2 aspiradores de pó\n- 10 sacos de 20 litros de entulho.\n\nInforme apenas *1 tipo* de material por vez. Depois você poderá acrescentar mais tipos de material.";

pub const COLLECT_NEXT_MATERIAL: &str = "Por favor, informe outro tipo de material e a quantidade de itens.\n\nLembre-se de informar apenas *1 tipo* de material por vez. Depois você poderá acrescentar mais tipos de material até o limite estabelecido.\n\nCaso não queira adicionar mais nenhum item, responda AVANÇAR.";

const NO_MATCH_PREFIX: &str = "Desculpe, não entendi.\n\n";

fn list_or_single(value: Option<&Value>) -> Vec<Value> {
    match value {
        Some(Value::Array(items)) => items.clone(),
        Some(Value::Null) | None => Vec::new(),
        Some(single) => vec![single.clone()],
    }
}

fn lowercase_name(key: &str, value: &Value) -> Result<String, ParamError> {
    value
        .as_str()
        .map(str::to_lowercase)
        .ok_or_else(|| ParamError::invalid(key, format!("expected a material name, got {value}")))
}

fn quantity(key: &str, value: &Value) -> Result<f64, ParamError> {
    number(value).ok_or_else(|| ParamError::invalid(key, format!("not a quantity: {value}")))
}

/// Records the material just informed and, when earlier materials exist, folds it
/// into the running lists (same material adds up, new material is appended).
pub fn merge_items(params: &mut SessionParameters) -> Result<(), ParamError> {
    let new_name = match params.get("rebi_material_nome") {
        None | Some(Value::Null) => String::new(),
        Some(v) => lowercase_name("rebi_material_nome", v)?,
    };
    let new_quantity = params.require("rebi_material_quantidade")?.clone();
    params.set("rebi_material_nome_novo", vec![new_name.clone()]);
    params.set("rebi_material_quantidade_novo", vec![new_quantity.clone()]);

    let mut names = list_or_single(params.get("rebi_material_nome_informado"));
    let mut quantities = list_or_single(params.get("rebi_material_quantidade_informada"));
    if names.is_empty() || quantities.is_empty() {
        return Ok(());
    }

    match names.iter().position(|n| n.as_str() == Some(new_name.as_str())) {
        Some(j) => {
            let current = quantities
                .get(j)
                .ok_or_else(|| {
                    ParamError::invalid("rebi_material_quantidade_informada", "shorter than names")
                })
                .and_then(|v| quantity("rebi_material_quantidade_informada", v))?;
            let added = quantity("rebi_material_quantidade", &new_quantity)?;
            quantities[j] = Value::from(current + added);
        }
        None => {
            names.push(Value::from(new_name));
            quantities.push(new_quantity);
        }
    }
    params.set("rebi_material_nome", names);
    params.set("rebi_material_quantidade", quantities);
    Ok(())
}

#[derive(Debug, Clone)]
struct Requested {
    name: String,
    quantity: Value,
    material: &'static Material,
    within_limit: bool,
}

impl Requested {
    fn amount(&self) -> String {
        format!(
            "{} {} de {}",
            quantity_label(&self.quantity),
            self.material.unit,
            capitalize(&self.name)
        )
    }
}

/// Per-group room left under every rule the current counts still fit.
pub fn allowed_additions(counts: [u32; 3]) -> Vec<[u32; 3]> {
    let mut remaining: Vec<[u32; 3]> = Vec::new();
    for combination in ALLOWED_COMBINATIONS {
        if counts.iter().zip(combination).all(|(c, max)| c <= max) {
            let room = [
                combination[0] - counts[0],
                combination[1] - counts[1],
                combination[2] - counts[2],
            ];
            if !remaining.contains(&room) {
                remaining.push(room);
            }
        }
    }
    remaining
}

/// "Você *ainda pode* adicionar:\n- 2 itens de material pequeno + 1 item de material grande\nOU\n- ..."
pub fn additions_text(allowances: &[[u32; 3]]) -> String {
    let mut text = String::new();
    for room in allowances.iter().filter(|room| room.iter().any(|v| *v > 0)) {
        if !text.is_empty() {
            text.push_str("\nOU");
        }
        for (group, value) in Group::ALL.iter().zip(room) {
            if text != ADDITIONS_HEADER && !text.is_empty() && *value >= 1 {
                if room[..group.index()].iter().any(|v| *v >= 1) {
                    text.push_str(" + ");
                } else {
                    text.push_str("\n- ");
                }
            } else if text.is_empty() {
                text.push_str(ADDITIONS_HEADER);
            }
            match *value {
                0 => {}
                1 => text.push_str(&format!("1 item de material {}", group.name())),
                n => text.push_str(&format!("{n} itens de material {}", group.name())),
            }
        }
    }
    text
}

/// Checks the informed materials against per-item limits and the group
/// combination rules, and writes the texts the flow shows next.
pub fn evaluate_items(params: &mut SessionParameters) -> Result<(), ParamError> {
    let names = list_or_single(params.get("rebi_material_nome"))
        .iter()
        .map(|v| lowercase_name("rebi_material_nome", v))
        .collect::<Result<Vec<_>, _>>()?;
    let quantities = list_or_single(Some(params.require("rebi_material_quantidade")?));

    let mut requested: Vec<Requested> = Vec::new();
    let mut counts = [0u32; 3];
    let mut all_within_limits = true;
    for (name, qty) in names.iter().zip(quantities.iter()) {
        let material = materials::find(name)
            .ok_or_else(|| ParamError::invalid("rebi_material_nome", format!("unknown material `{name}`")))?;
        let within_limit = quantity("rebi_material_quantidade", qty)? <= f64::from(material.limit);
        all_within_limits &= within_limit;
        counts[material.group.index()] += 1;
        let entry = Requested {
            name: name.clone(),
            quantity: qty.clone(),
            material,
            within_limit,
        };
        match requested.iter_mut().find(|r| r.name == *name) {
            Some(existing) => *existing = entry,
            None => requested.push(entry),
        }
    }
    params.set("rebi_combinacao_itens_valida", all_within_limits);

    let new_names = list_or_single(params.get("rebi_material_nome_novo"));
    let new_quantities = list_or_single(params.get("rebi_material_quantidade_novo"));
    let just_added: Vec<Requested> = requested
        .iter()
        .filter_map(|r| {
            let j = new_names
                .iter()
                .position(|n| n.as_str() == Some(r.name.as_str()))?;
            let mut added = r.clone();
            if let Some(q) = new_quantities.get(j) {
                added.quantity = q.clone();
            }
            Some(added)
        })
        .collect();

    if !all_within_limits {
        let limits: Vec<String> = requested
            .iter()
            .filter(|r| !r.within_limit)
            .map(|r| {
                format!(
                    "O limite para remoção de {} é de {} {}.",
                    r.name, r.material.limit, r.material.unit
                )
            })
            .collect();
        params.set(
            "rebi_justificativa_combinacao_invalida",
            format!(
                "{}\n\nInforme uma quantidade de itens dentro desse limite.",
                limits.join("\n\n")
            ),
        );
        return Ok(());
    }

    let allowances = allowed_additions(counts);
    if allowances.is_empty() {
        params.set("rebi_combinacao_itens_valida", false);
        let added: Vec<String> = just_added
            .iter()
            .map(|r| format!("{} (material {})", r.amount(), r.material.group.name()))
            .collect();
        let lead = if added.is_empty() {
            String::new()
        } else {
            format!("Você solicitou a retirada de {}", added.join(", "))
        };
        params.set(
            "rebi_justificativa_combinacao_invalida",
            format!("{lead}, mas esse material *não pode ser incluído* junto com os materiais que já foram selecionados."),
        );
        return Ok(());
    }

    let additions = additions_text(&allowances);
    if additions.is_empty() {
        params.set("rebi_eligibilidade_mais_itens", false);
    } else {
        params.set("rebi_combinacoes_disponiveis_texto", additions);
        params.set("rebi_eligibilidade_mais_itens", true);
    }

    params.set("rebi_material_nome", names);
    params.set("rebi_material_quantidade", quantities);

    let rules: Vec<String> = just_added.iter().map(Requested::amount).collect();
    let description: Vec<String> = requested
        .iter()
        .map(|r| format!("\n- {} (material {})", r.amount(), r.material.group.name()))
        .collect();
    params.set("rebi_material_informado_regras", rules.join(", "));
    params.set("rebi_material_informado_descricao", description.join("\n"));
    Ok(())
}

/// Commits the evaluated lists as the informed materials.
pub fn confirm_items(params: &mut SessionParameters) -> Result<(), ParamError> {
    let names = params.require("rebi_material_nome")?.clone();
    let quantities = params.require("rebi_material_quantidade")?.clone();
    params.set("rebi_material_nome_informado", names);
    params.set("rebi_material_quantidade_informada", quantities);
    Ok(())
}

pub fn define_collection_texts(params: &mut SessionParameters) {
    params.set("rebi_coleta_material_1", COLLECT_FIRST_MATERIAL);
    params.set("rebi_coleta_material_2", COLLECT_NEXT_MATERIAL);
    params.set(
        "rebi_coleta_material_nomatch_1",
        format!("{NO_MATCH_PREFIX}{COLLECT_FIRST_MATERIAL}"),
    );
    params.set(
        "rebi_coleta_material_nomatch_2",
        format!("{NO_MATCH_PREFIX}{COLLECT_NEXT_MATERIAL}"),
    );
}

const AMBIGUOUS_MATERIALS: &[(&[&str], &str)] = &[
    (
        &["cama", "camas"],
        "Você quis dizer Cama de solteiro ou Cama de casal?\n\nPor favor, informe qual é o tipo de material e a quantidade.",
    ),
    (
        &["colchão", "colchao", "colchoes", "colchões", "colxao", "colxoes", "colxões", "colxão"],
        "Você quis dizer Colchão de solteiro ou Colchão de casal?\n\nPor favor, informe qual é o tipo de material e a quantidade.",
    ),
    (
        &["armario", "armário", "armários"],
        "Você quis dizer Armário de alumínio de cozinha, Armário de 4 portas/guarda-roupa ou Armário pequeno até 3 portas/cômoda?\n\nPor favor, informe qual é o tipo de material e a quantidade.",
    ),
    (
        &["telha", "telhas"],
        "Você quis dizer Telha de alumínio, Telha de amianto ou Telha francesa/tijolo?\n\nPor favor, informe qual é o tipo de material e a quantidade.",
    ),
    (
        &["tanque", "tanques"],
        "Você quis dizer Tanque de lavagem de plástico/louça ou Tanque de concreto?\n\nPor favor, informe qual é o tipo de material e a quantidade.",
    ),
    (
        &["vaso", "vasos"],
        "Você quis dizer Vaso de planta com terra ou Vaso sanitário/bidê/lavatório?\n\nPor favor, informe qual é o tipo de material e a quantidade.",
    ),
];

/// Clarifying question when the user's message names a material that exists in
/// more than one variant.
pub fn duplicate_item_hint(text: &str) -> Option<&'static str> {
    AMBIGUOUS_MATERIALS
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| text.contains(k)))
        .map(|(_, question)| *question)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(value: Value) -> SessionParameters {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn first_material_only_records_new_lists() {
        let mut p = params(json!({"rebi_material_nome": "Geladeira/Freezer", "rebi_material_quantidade": 1.0}));
        merge_items(&mut p).unwrap();
        assert_eq!(p["rebi_material_nome_novo"], json!(["geladeira/freezer"]));
        assert_eq!(p["rebi_material_quantidade_novo"], json!([1.0]));
        assert_eq!(p["rebi_material_nome"], json!("Geladeira/Freezer"));
    }

    #[test]
    fn repeated_material_adds_quantities() {
        let mut p = params(json!({
            "rebi_material_nome": "entulho",
            "rebi_material_quantidade": 5.0,
            "rebi_material_nome_informado": ["mesa", "entulho"],
            "rebi_material_quantidade_informada": [1.0, 10.0]
        }));
        merge_items(&mut p).unwrap();
        assert_eq!(p["rebi_material_nome"], json!(["mesa", "entulho"]));
        assert_eq!(p["rebi_material_quantidade"], json!([1.0, 15.0]));
        assert_eq!(p["rebi_material_quantidade_informada"], json!([1.0, 10.0]));
    }

    #[test]
    fn new_material_is_appended() {
        let mut p = params(json!({
            "rebi_material_nome": "fogão",
            "rebi_material_quantidade": 1.0,
            "rebi_material_nome_informado": ["mesa"],
            "rebi_material_quantidade_informada": [2.0]
        }));
        merge_items(&mut p).unwrap();
        assert_eq!(p["rebi_material_nome"], json!(["mesa", "fogão"]));
        assert_eq!(p["rebi_material_quantidade"], json!([2.0, 1.0]));
    }

    #[test]
    fn allowances_subtract_counts_from_fitting_rules() {
        assert_eq!(allowed_additions([0, 0, 0]), vec![[5, 2, 0], [3, 0, 1], [0, 1, 1]]);
        assert_eq!(allowed_additions([1, 1, 0]), vec![[4, 1, 0]]);
        assert!(allowed_additions([0, 2, 1]).is_empty());
    }

    #[test]
    fn additions_text_joins_alternatives() {
        assert_eq!(
            additions_text(&[[4, 1, 0], [0, 0, 1]]),
            "Você *ainda pode* adicionar:\n- 4 itens de material pequeno + 1 item de material grande\nOU\n- 1 item de material especial"
        );
        assert_eq!(
            additions_text(&[[0, 1, 1]]),
            "Você *ainda pode* adicionar:\n- 1 item de material grande + 1 item de material especial"
        );
        assert_eq!(additions_text(&[[0, 0, 0]]), "");
    }

    #[test]
    fn over_limit_quantity_is_explained() {
        let mut p = params(json!({
            "rebi_material_nome": ["geladeira/freezer"],
            "rebi_material_quantidade": [3.0],
            "rebi_material_nome_novo": ["geladeira/freezer"],
            "rebi_material_quantidade_novo": [3.0]
        }));
        evaluate_items(&mut p).unwrap();
        assert_eq!(p["rebi_combinacao_itens_valida"], json!(false));
        assert_eq!(
            p["rebi_justificativa_combinacao_invalida"],
            "O limite para remoção de geladeira/freezer é de 1 unidade.\n\nInforme uma quantidade de itens dentro desse limite."
        );
    }

    #[test]
    fn incompatible_mix_is_rejected() {
        let mut p = params(json!({
            "rebi_material_nome": ["fogão", "geladeira/freezer", "entulho"],
            "rebi_material_quantidade": [1.0, 1.0, 10.0],
            "rebi_material_nome_novo": ["entulho"],
            "rebi_material_quantidade_novo": [10.0]
        }));
        evaluate_items(&mut p).unwrap();
        assert_eq!(p["rebi_combinacao_itens_valida"], json!(false));
        assert_eq!(
            p["rebi_justificativa_combinacao_invalida"],
            "Você solicitou a retirada de 10 sacos plásticos de até 20 litros de Entulho (material especial), mas esse material *não pode ser incluído* junto com os materiais que já foram selecionados."
        );
    }

    #[test]
    fn valid_mix_describes_items_and_room_left() {
        let mut p = params(json!({
            "rebi_material_nome": ["Mesa", "fogão"],
            "rebi_material_quantidade": [2.0, 1.0],
            "rebi_material_nome_novo": ["fogão"],
            "rebi_material_quantidade_novo": [1.0]
        }));
        evaluate_items(&mut p).unwrap();
        assert_eq!(p["rebi_combinacao_itens_valida"], json!(true));
        assert_eq!(p["rebi_eligibilidade_mais_itens"], json!(true));
        assert_eq!(
            p["rebi_combinacoes_disponiveis_texto"],
            "Você *ainda pode* adicionar:\n- 4 itens de material pequeno + 1 item de material grande"
        );
        assert_eq!(p["rebi_material_nome"], json!(["mesa", "fogão"]));
        assert_eq!(p["rebi_material_informado_regras"], "1 unidade de Fogão");
        assert_eq!(
            p["rebi_material_informado_descricao"],
            "\n- 2 unidades de Mesa (material pequeno)\n\n- 1 unidade de Fogão (material grande)"
        );
    }

    #[test]
    fn unknown_material_is_an_error() {
        let mut p = params(json!({"rebi_material_nome": "piano", "rebi_material_quantidade": 1.0}));
        assert!(evaluate_items(&mut p).is_err());
    }

    #[test]
    fn collection_texts_include_no_match_variants() {
        let mut p = SessionParameters::new();
        define_collection_texts(&mut p);
        assert!(p["rebi_coleta_material_nomatch_2"]
            .as_str()
            .unwrap()
            .starts_with("Desculpe, não entendi.\n\nPor favor, informe outro tipo"));
    }

    #[test]
    fn ambiguous_materials_get_a_question() {
        assert!(duplicate_item_hint("quero tirar 2 camas")
            .unwrap()
            .starts_with("Você quis dizer Cama"));
        assert!(duplicate_item_hint("um colchão velho")
            .unwrap()
            .starts_with("Você quis dizer Colchão"));
        assert_eq!(duplicate_item_hint("uma geladeira"), None);
    }
}
