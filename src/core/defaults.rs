// File: src/core/defaults.rs
//! Built-in stimulus set: the ten figures of the battery, the foils printed on
//! the recognition sheet and the animal names accepted in verbal fluency.

use crate::core::vocabulary::{RecognitionItem, TargetSpec};

const TARGETS: &[(&str, &[&str])] = &[
    ("sapato", &["tênis", "calçado", "sapatinho"]),
    ("casa", &["casinha", "lar", "residência"]),
    ("pente", &["pentinho"]),
    ("chave", &["chavinha"]),
    ("avião", &["aeronave", "avioneta", "jatinho", "jato"]),
    ("balde", &["baldinho", "tina"]),
    ("tartaruga", &["jabuti", "cágado", "tracajá"]),
    ("livro", &["livrinho"]),
    ("colher", &["colherinha"]),
    ("árvore", &["arvorezinha", "pinheiro"]),
];

const DISTRACTORS: &[&str] = &[
    "chaleira",
    "caminhão",
    "cadeira",
    "relógio",
    "guarda-chuva",
    "tesoura",
    "garrafa",
    "bicicleta",
    "óculos",
    "vaso",
];

/// Extra names accepted only while the recognition sheet is in front of the subject.
const RECOGNITION_SYNONYMS: &[(&str, &[&str])] = &[
    ("sapato", &["sapatilha"]),
    ("tartaruga", &["quelônio"]),
    ("chaleira", &["bule"]),
    ("bicicleta", &["bike", "bicicletinha"]),
    ("relógio", &["despertador"]),
    ("guarda-chuva", &["sombrinha"]),
    ("garrafa", &["garrafinha"]),
];

/// Compounds are listed once; hyphenated spellings fold onto the spaced form.
const ANIMALS: &[&str] = &[
    // single words
    "abelha", "águia", "ariranha", "alce", "anta", "aranha", "arara", "avestruz", "baleia",
    "barata", "besouro", "bode", "boi", "borboleta", "búfalo", "burro", "cabra",
    "cachorro", "cão", "cadela", "camelo", "camaleão", "camarão", "canguru",
    "capivara", "caracol", "caranguejo", "carneiro", "cavalo", "cegonha", "cervo",
    "chimpanzé", "cisne", "coala", "cobra", "codorna", "coelho", "coruja", "corvo",
    "crocodilo", "cutia", "dromedário", "elefante", "ema", "esquilo", "falcão",
    "foca", "formiga", "galinha", "galo", "gambá", "ganso", "gato", "gata",
    "gavião", "girafa", "golfinho", "gorila", "grilo", "guaxinim", "hamster",
    "hiena", "hipopótamo", "iguana", "jacaré", "jaguar", "javali", "jiboia",
    "joaninha", "lagartixa", "lagarto", "lagosta", "leão", "leoa", "leopardo",
    "lesma", "lhama", "lobo", "lontra", "macaco", "minhoca", "morcego", "mosca",
    "mosquito", "mula", "onça", "orangotango", "ornitorrinco", "ovelha", "panda",
    "papagaio", "pardal", "pato", "pavão", "peixe", "pelicano", "periquito",
    "perdiz", "peru", "pinguim", "piranha", "polvo", "pombo", "pomba", "porco",
    "preguiça", "pulga", "quati", "raposa", "rato", "rinoceronte", "sabiá",
    "sapo", "sardinha", "siri", "suricato", "tamanduá", "tatu", "texugo",
    "tigre", "touro", "tubarão", "tucano", "urso", "urubu", "vaca", "vespa",
    "veado", "zebra",
    // two words
    "lobo guará", "urso polar", "urso panda", "onça pintada", "peixe boi",
    "cavalo marinho", "beija flor", "bicho preguiça",
    "porco espinho", "tamanduá bandeira", "arara azul", "leão marinho",
    "elefante marinho", "tubarão branco", "urso pardo", "galinha d'angola",
    "mico leão", "pica pau",
    // three words and longer
    "mico leão dourado", "estrela do mar", "joão de barro", "louva a deus",
    "bem te vi", "cobra de duas cabeças", "boto cor de rosa",
];

pub fn targets() -> Vec<TargetSpec> {
    TARGETS
        .iter()
        .map(|(word, synonyms)| TargetSpec {
            word: word.to_string(),
            synonyms: synonyms.iter().map(|s| s.to_string()).collect(),
        })
        .collect()
}

pub fn distractors() -> Vec<String> {
    DISTRACTORS.iter().map(|s| s.to_string()).collect()
}

/// The recognition sheet: every target followed by every foil.
pub fn recognition_items() -> Vec<RecognitionItem> {
    let synonyms_for = |word: &str| -> Vec<String> {
        RECOGNITION_SYNONYMS
            .iter()
            .find(|(w, _)| *w == word)
            .map(|(_, syns)| syns.iter().map(|s| s.to_string()).collect())
            .unwrap_or_default()
    };

    let targets = TARGETS.iter().map(|(word, _)| (*word, true));
    let foils = DISTRACTORS.iter().map(|word| (*word, false));
    targets
        .chain(foils)
        .map(|(word, is_target)| RecognitionItem {
            word: word.to_string(),
            is_target,
            synonyms: synonyms_for(word),
        })
        .collect()
}

pub fn animals() -> Vec<String> {
    ANIMALS.iter().map(|s| s.to_string()).collect()
}
