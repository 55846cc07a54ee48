//! GraphQL operation documents used against the PEC API.
//!
//! Operation names must match the names inside the documents; the service
//! logs and authorizes by them.

/// A named GraphQL document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operation {
    pub name: &'static str,
    pub document: &'static str,
}

/// Session login. Variables: `input { username, password, force }`.
pub const LOGIN: Operation = Operation {
    name: "Login",
    document: "mutation Login($input: LoginInput!) {\n  login(input: $input) {\n    success\n  }\n}\n",
};

/// Session introspection: the logged-in professional's access grants.
pub const SESSION: Operation = Operation {
    name: "Sessao",
    document: "query Sessao {\n  sessao {\n    profissional {\n      acessos {\n        id\n        ... on Lotacao {\n          unidadeSaude {\n            id\n            nome\n          }\n        }\n      }\n    }\n  }\n}\n",
};

/// Active scope selection. Variables: `input { id }`.
pub const SELECT_ACCESS: Operation = Operation {
    name: "SelecionarAcesso",
    document: "mutation SelecionarAcesso($input: SelecionarAcessoInput!) {\n  selecionarAcesso(input: $input) {\n    id\n  }\n}\n",
};

/// Citizen search by name, CPF, or CNS.
pub const CITIZEN_SEARCH: Operation = Operation {
    name: "CidadaoAtendimentoSelectField",
    document: "query CidadaoAtendimentoSelectField($input: CidadaosComboQueryInput!, $emAtencaoDomiciliar: Boolean!, $retrieveContato: Boolean!) {\n  cidadaosCombo(input: $input, atencaoDomiciliar: $emAtencaoDomiciliar) {\n    id\n    nome\n    nomeSocial\n    cpf\n    cns\n    dataNascimento\n    contato @include(if: $retrieveContato) {\n      id\n      telefoneCelular\n      email\n    }\n  }\n}\n",
};

/// The health unit of a citizen's team binding.
pub const CITIZEN_DETAIL: Operation = Operation {
    name: "BuscaDetailCidadao",
    document: "query BuscaDetailCidadao($id: ID!) {\n  cidadao(id: $id) {\n    cidadaoVinculacaoEquipe {\n      unidadeSaude {\n        id\n        nome\n      }\n    }\n  }\n}\n",
};

/// Professionals filtered by health unit or CBO.
pub const PROFESSIONALS: Operation = Operation {
    name: "ProfissionalTable",
    document: "query ProfissionalTable($input: ProfissionaisQueryInput!) {\n  profissionais(input: $input) {\n    content {\n      id\n      nome\n      nomeSocial\n      lotacoes {\n        id\n        ativo\n        hasConfiguracaoAgenda\n        cbo {\n          id\n          nome\n        }\n      }\n    }\n  }\n}\n",
};

/// A scope's slots for one day.
pub const SCHEDULE_SLOTS: Operation = Operation {
    name: "HorarioAgendaSelectField",
    document: "query HorarioAgendaSelectField($input: HorariosAgendaQueryInput!) {\n  horariosAgenda(input: $input) {\n    horario\n    duracao\n    isOcupado\n  }\n}\n",
};

/// Appointment creation; returns the new appointment id.
pub const SAVE_APPOINTMENT: Operation = Operation {
    name: "SalvarAgendamentoConsulta",
    document: "mutation SalvarAgendamentoConsulta($input: CriarAgendamentoConsultaInput!) {\n  salvarAgendamentoConsulta(input: $input)\n}\n",
};

/// The health unit a scope is bound to.
pub const SCOPE_UNIT: Operation = Operation {
    name: "LotacaoAgendaSelect",
    document: "query LotacaoAgendaSelect($id: ID!) {\n  lotacao(id: $id) {\n    unidadeSaude {\n      id\n      nome\n    }\n  }\n}\n",
};

/// Booked appointments of a scope within a day.
pub const DAY_AGENDA: Operation = Operation {
    name: "AgendamentosDiaLotacao",
    document: "query AgendamentosDiaLotacao($input: AgendadosQueryInput!) {\n  agendados(input: $input) {\n    content {\n      id\n      horarioInicial\n      situacao\n      cidadao {\n        id\n        nome\n      }\n    }\n  }\n}\n",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_declare_their_operation_names() {
        for op in [
            LOGIN,
            SESSION,
            SELECT_ACCESS,
            CITIZEN_SEARCH,
            CITIZEN_DETAIL,
            PROFESSIONALS,
            SCHEDULE_SLOTS,
            SAVE_APPOINTMENT,
            SCOPE_UNIT,
            DAY_AGENDA,
        ] {
            let header = op.document.lines().next().unwrap_or_default();
            assert!(
                header.contains(&format!(" {}", op.name)),
                "{} not declared in {header}",
                op.name
            );
        }
    }
}
