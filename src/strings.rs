use std::sync::LazyLock;
use ustr::Ustr;

macro_rules! str_const {
    ($($name:ident = $str:literal);*; ) => {
        $(pub static $name: LazyLock<Ustr> = LazyLock::new(|| Ustr::from($str));)*
    };
}

// Justification keywords:
str_const! {
    PREMISE = "prem";
    HYPOTHESIS = "hyp";
}

// Rewrite citations:
str_const! {
    COMM = "comm";
    ASSOC = "assoc";
    DOUBLE_NEG = "dn";
    IMPL = "impl";
    DE_MORGAN = "dm";
    DIST = "dist";
    IDEM = "idem";
    EXPORTATION = "exp";
    CONTRAPOSITIVE = "contra";
}

// Inference citations:
str_const! {
    APPLY = "apply";
    COMPOSE = "compose";
    PROJ_L = "projl";
    PROJ_R = "projr";
    INJ_L = "injl";
    INJ_R = "injr";
    DIAG = "diag";
    CODIAG = "codiag";
    UNIV_PROD = "univprod";
    UNIV_COPROD = "univcoprod";
    AND_INTRO = "andi";
    NOT_ELIM = "note";
    EX_FALSO = "efq";
    IMP_INTRO = "impi";
    NOT_INTRO = "noti";
    OR_ELIM = "ore";
    FORALL_ELIM = "alle";
    FORALL_INTRO = "alli";
    EXISTS_INTRO = "existsi";
    EXISTS_ELIM = "existse";
}

// Pattern holes:
str_const! {
    HOLE_A = "a";
    HOLE_B = "b";
    HOLE_C = "c";
    HOLE_X = "x";
}
