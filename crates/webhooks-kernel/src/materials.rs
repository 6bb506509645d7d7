/// Size class used by the removal rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Group {
    Small,
    Large,
    Special,
}

impl Group {
    pub const ALL: [Group; 3] = [Group::Small, Group::Large, Group::Special];

    pub fn index(self) -> usize {
        match self {
            Group::Small => 0,
            Group::Large => 1,
            Group::Special => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Group::Small => "pequeno",
            Group::Large => "grande",
            Group::Special => "especial",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Material {
    pub id: u32,
    pub name: &'static str,
    /// Most units of this material accepted in a single request.
    pub limit: u32,
    pub unit: &'static str,
    pub group: Group,
}

/// Looks up a material by the lowercase name the agent's entity resolves to.
pub fn find(name: &str) -> Option<&'static Material> {
    CATALOGUE.iter().find(|m| m.name == name)
}

pub const CATALOGUE: &[Material] = &[
    Material {
        id: 3,
        name: "ar condicionado",
        limit: 1,
        unit: "unidade",
        group: Group::Large,
    },
    Material {
        id: 5,
        name: "armário de alumínio de cozinha/banheiro",
        limit: 2,
        unit: "unidades",
        group: Group::Small,
    },
    Material {
        id: 6,
        name: "armário de 4 portas duplex/guarda roupa",
        limit: 1,
        unit: "unidade desmontada",
        group: Group::Special,
    },
    Material {
        id: 7,
        name: "aspirador de pó",
        limit: 2,
        unit: "unidades",
        group: Group::Small,
    },
    Material {
        id: 8,
        name: "banheira",
        limit: 1,
        unit: "unidade",
        group: Group::Large,
    },
    Material {
        id: 9,
        name: "bicicleta/velocípede",
        limit: 2,
        unit: "unidades",
        group: Group::Small,
    },
    Material {
        id: 10,
        name: "boiler",
        limit: 1,
        unit: "unidade",
        group: Group::Large,
    },
    Material {
        id: 11,
        name: "cadeiras/bancos",
        limit: 6,
        unit: "unidades",
        group: Group::Small,
    },
    Material {
        id: 12,
        name: "caixonete de porta/janela",
        limit: 5,
        unit: "amarrados de até 1,5 m",
        group: Group::Small,
    },
    Material {
        id: 13,
        name: "canos/tubos/trilhos de cortina",
        limit: 5,
        unit: "amarrados de até 1,5 m",
        group: Group::Small,
    },
    Material {
        id: 14,
        name: "cama de casal",
        limit: 1,
        unit: "unidade desmontada",
        group: Group::Large,
    },
    Material {
        id: 15,
        name: "cama de solteiro",
        limit: 2,
        unit: "unidades desmontadas",
        group: Group::Small,
    },
    Material {
        id: 16,
        name: "carpete/tapete/passadeira/colchonete",
        limit: 5,
        unit: "rolos",
        group: Group::Small,
    },
    Material {
        id: 17,
        name: "cofre",
        limit: 1,
        unit: "unidade até 60 kg",
        group: Group::Large,
    },
    Material {
        id: 18,
        name: "colchão de casal",
        limit: 1,
        unit: "unidade",
        group: Group::Large,
    },
    Material {
        id: 19,
        name: "colchão de solteiro",
        limit: 2,
        unit: "unidades",
        group: Group::Small,
    },
    Material {
        id: 20,
        name: "computador / impressora",
        limit: 2,
        unit: "unidades",
        group: Group::Small,
    },
    Material {
        id: 21,
        name: "entulho",
        limit: 150,
        unit: "sacos plásticos de até 20 litros",
        group: Group::Special,
    },
    Material {
        id: 22,
        name: "escada",
        limit: 1,
        unit: "unidade",
        group: Group::Large,
    },
    Material {
        id: 23,
        name: "espelho/quadro/persiana",
        limit: 6,
        unit: "unidades",
        group: Group::Small,
    },
    Material {
        id: 24,
        name: "exaustor/sugar/coifa",
        limit: 2,
        unit: "unidades",
        group: Group::Small,
    },
    Material {
        id: 25,
        name: "estante/rack",
        limit: 1,
        unit: "unidade desmontada",
        group: Group::Large,
    },
    Material {
        id: 26,
        name: "fogão",
        limit: 1,
        unit: "unidade",
        group: Group::Large,
    },
    Material {
        id: 27,
        name: "forno de microondas/elétrico",
        limit: 1,
        unit: "unidade",
        group: Group::Small,
    },
    Material {
        id: 28,
        name: "galhadas",
        limit: 12,
        unit: "amarrados",
        group: Group::Small,
    },
    Material {
        id: 29,
        name: "garrafas de cerveja / vidro",
        limit: 5,
        unit: "caixas/engradados até 10kg",
        group: Group::Small,
    },
    Material {
        id: 30,
        name: "geladeira/freezer",
        limit: 1,
        unit: "unidade",
        group: Group::Large,
    },
    Material {
        id: 31,
        name: "gesso / azulejos /cerâmicas",
        limit: 10,
        unit: "amarrados/caixas até 10kg",
        group: Group::Small,
    },
    Material {
        id: 32,
        name: "grade de madeira ou ferro",
        limit: 4,
        unit: "unidades",
        group: Group::Small,
    },
    Material {
        id: 33,
        name: "latão de 200 litros",
        limit: 1,
        unit: "unidade",
        group: Group::Large,
    },
    Material {
        id: 34,
        name: "latas/baldes/bacias",
        limit: 10,
        unit: "latas até 20 litros",
        group: Group::Small,
    },
    Material {
        id: 35,
        name: "livros/revistas/jornais/papelão",
        limit: 5,
        unit: "caixas/sacos/amarrados de até 10 kg",
        group: Group::Small,
    },
    Material {
        id: 36,
        name: "luminária",
        limit: 5,
        unit: "unidades",
        group: Group::Small,
    },
    Material {
        id: 37,
        name: "madeiras/caixote/estrados/vulcapiso",
        limit: 5,
        unit: "amarrados até 1,5m",
        group: Group::Small,
    },
    Material {
        id: 38,
        name: "máquina de lavar roupas/louças",
        limit: 1,
        unit: "unidade",
        group: Group::Large,
    },
    Material {
        id: 39,
        name: "máquina de costura",
        limit: 2,
        unit: "unidades",
        group: Group::Small,
    },
    Material {
        id: 40,
        name: "mesa",
        limit: 2,
        unit: "unidades",
        group: Group::Small,
    },
    Material {
        id: 41,
        name: "outros",
        limit: 5,
        unit: "unidades",
        group: Group::Small,
    },
    Material {
        id: 42,
        name: "pedras",
        limit: 10,
        unit: "unidades até 10 kg",
        group: Group::Small,
    },
    Material {
        id: 43,
        name: "pias/bancadas/cubas",
        limit: 3,
        unit: "unidades",
        group: Group::Small,
    },
    Material {
        id: 44,
        name: "porta/janela/basculante",
        limit: 4,
        unit: "unidades",
        group: Group::Small,
    },
    Material {
        id: 45,
        name: "sofá/poltrona",
        limit: 2,
        unit: "unidades",
        group: Group::Large,
    },
    Material {
        id: 46,
        name: "tábua de passar roupas",
        limit: 2,
        unit: "unidades",
        group: Group::Small,
    },
    Material {
        id: 47,
        name: "tacos",
        limit: 150,
        unit: "sacos plásticos de até 20 litros",
        group: Group::Small,
    },
    Material {
        id: 48,
        name: "tanque de lavagem plástico/louça",
        limit: 2,
        unit: "unidades",
        group: Group::Small,
    },
    Material {
        id: 49,
        name: "tanque de concreto",
        limit: 150,
        unit: "sacos plásticos de até 20 litros",
        group: Group::Special,
    },
    Material {
        id: 50,
        name: "telha de aluminio",
        limit: 5,
        unit: "unidades",
        group: Group::Small,
    },
    Material {
        id: 51,
        name: "telha de amianto",
        limit: 20,
        unit: "pedaços até 10 kg",
        group: Group::Small,
    },
    Material {
        id: 52,
        name: "telha francesa/tijolo",
        limit: 150,
        unit: "unidades",
        group: Group::Small,
    },
    Material {
        id: 53,
        name: "tronco de árvore",
        limit: 5,
        unit: "unidades de até 10 kg",
        group: Group::Small,
    },
    Material {
        id: 54,
        name: "vaso de planta com terra",
        limit: 2,
        unit: "unidades",
        group: Group::Small,
    },
    Material {
        id: 55,
        name: "vaso sanitário/bidê/lavatório",
        limit: 3,
        unit: "unidades",
        group: Group::Small,
    },
    Material {
        id: 56,
        name: "aquecedor/cx descarga",
        limit: 2,
        unit: "unidades",
        group: Group::Small,
    },
    Material {
        id: 57,
        name: "aparelho de som/tv/vídeo/vitrola",
        limit: 2,
        unit: "unidades",
        group: Group::Small,
    },
    Material {
        id: 58,
        name: "armário peq até 3 portas/cômoda",
        limit: 1,
        unit: "unidade desmontada",
        group: Group::Small,
    },
];
