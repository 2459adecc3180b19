//! B3 ticker universe
//!
//! Built-in list of listed B3 stocks plus helpers to parse a user supplied
//! list. Tickers are kept without the `.SA` suffix Yahoo Finance expects;
//! [`yahoo_symbol`] adds it at request time.

use anyhow::Context;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use crate::error::Result;

const YAHOO_SUFFIX: &str = ".SA";

/// Listed B3 stocks collected by default.
const B3_TICKERS: &[&str] = &[
    "HAPV3", "CSAN3", "COGN3", "CSNA3", "BBDC4", "ABEV3", "B3SA3", "PETR4", "HYPE3", "VALE3",
    "ITSA4", "LREN3", "ITUB4", "CPLE6", "RENT3", "MGLU3", "BBAS3", "ELET3", "RADL3", "PRIO3",
    "ASAI3", "VAMO3", "HBSA3", "MRVE3", "POMO4", "RAIZ4", "ONCO3", "BBDC3", "LWSA3", "PETR3",
    "VBBR3", "CMIG4", "AZEV4", "JHSF3", "CCRO3", "RAIL3", "CRFB3", "UGPA3", "GGBR4", "ANIM3",
    "BRFS3", "NTCO3", "BPAC11", "GGPS3", "EMBR3", "MRFG3", "YDUQ3", "BEEF3", "EQTL3", "CVCB3",
    "CPLE3", "USIM5", "JBSS3", "FLRY3", "RAPT4", "MOVI3", "CEAB3", "GOAU4", "TIMS3", "AMOB3",
    "AZUL4", "KLBN11", "ENGI11", "RDOR3", "TOTS3", "ENEV3", "AURE3", "PCAR3", "WEGE3", "BRAV3",
    "ECOR3", "SUZB3", "SMFT3", "CYRE3", "EZTC3", "BRKM5", "GMAT3", "CMIN3", "IFCM3", "CXSE3",
    "BBSE3", "CAML3", "SIMH3", "SBFG3", "ALOS3", "SRNA3", "VIVT3", "ARML3", "CBAV3", "CPFE3",
    "INTB3", "AZEV3", "IGTI11", "SBSP3", "MULT3", "EGIE3", "ELET6", "STBP3", "LJQQ3", "MILS3",
    "KEPL3", "VIVA3", "PETZ3", "PDGR3", "ALPA4", "SANB11", "BHIA3", "TEND3", "PSSA3", "SLCE3",
    "DXCO3", "IRBR3", "RCSL4", "RECV3", "GRND3", "QUAL3", "BRAP4", "KLBN4", "AZZA3", "ISAE4",
    "CLSA3", "CSMG3", "TAEE11", "GOLL4", "SAPR4", "BPAN4", "BRSR6", "OIBR3", "DIRR3", "ODPV3",
    "AGRO3", "GUAR3", "TTEN3", "GFSA3", "VVEO3", "CURY3", "POMO3", "PORT3", "SMTO3", "MYPK3",
    "MDNE3", "NEOE3", "PLPL3", "SAPR11", "ALUP11", "EVEN3", "JALL3", "MATD3", "MLAS3", "ITUB3",
    "RCSL3", "PGMN3", "AMER3", "VULC3", "POSI3", "CSED3", "WIZC3", "DASA3", "AMAR3", "SYNE3",
    "CASH3", "HBRE3", "ZAMP3", "BMOB3", "ABCB4", "RANI3", "SEQL3", "SOJA3", "LAVV3", "MDIA3",
    "ESPA3", "MTRE3", "BMGB4", "FIQE3", "MELK3", "BRBI11", "JSLG3", "FESA4", "HBOR3", "LPSB3",
    "VLID3", "TRIS3", "PTBL3", "TFCO4", "SEER3", "TUPY3", "PINE4", "KLBN3", "SHUL4", "BRST3",
    "ORVR3", "VITT3", "ENJU3", "PNVL3", "AERI3", "LIGT3", "FRAS3", "SAPR3", "BLAU3", "DESK3",
    "USIM3", "LOGG3", "MEAL3", "SANB3", "LEVE3", "PRNR3", "OPCT3", "TASA4", "BOBR4", "PFRM3",
    "VIVR3", "ITSA3", "UNIP6", "AGXY3", "LUPA3", "MBLY3", "RNEW4", "AMBP3", "ELMD3", "TGMA3",
    "TAEE4", "SANB4", "AALR3", "VTRU3", "LOGN3", "ROMI3", "TECN3", "SHOW3", "CSUD3", "AZEV11",
    "BRKM3", "PMAM3", "ALPK3", "KRSA3", "EUCA4", "PDTC3", "DEXP3", "CAMB3", "RNEW3", "DMVF3",
    "TAEE3", "ALLD3", "SCAR3", "VSTE3", "ALPA3", "IGTI3", "CMIG3", "GOAU3", "ETER3", "INEP3",
    "BIOM3", "RSID3", "BRAP3", "TCSA3", "FICT3", "UCAS3", "CEBR6", "NGRD3", "ENGI4", "DASA11",
    "TRAD3", "TPIS3", "FHER3", "OIBR4", "LVTC3", "LAND3", "EALT4", "OFSA3", "FRIO3", "ALUP4",
    "GGBR3", "PTNT4", "INEP4", "BMEB4", "BEES3", "BPAC5", "HAGA3", "JFEN3", "UNIP3", "ALUP3",
    "MGEL4", "CTSA4", "ENGI3", "OSXB3", "WHRL3", "BIED3", "DOTZ3", "PINE3", "COCE5", "ATED3",
    "MTSA4", "TELB3", "RAPT3", "TASA3", "WHRL4", "AMAR11", "BRSR3", "CLSC4", "BPAC3", "EMAE4",
    "PTNT3", "RDNI3", "RNEW11", "ATMP3", "BAZA3", "GEPA3", "WEST3", "RPMG3", "REDE3", "HAGA4",
    "BGIP4", "BEES4", "SNSY5", "BNBR3", "ISAE3", "RSUL4", "EPAR3", "PEAB4", "CGRA4", "NUTR3",
    "GEPA4", "AVLL3", "RPAD3", "AHEB3", "BSLI4", "CEBR5", "EUCA3", "PLAS3", "EQPA3", "BMIN4",
    "TELB4", "IGTI4", "NEXP3", "PEAB3", "MNDL3", "CRPG5", "CRPG6", "EKTR4", "WLMM4", "EALT3",
    "DEXP4", "RPAD5", "PPLA11", "BAUH4", "AHEB6", "CEEB3", "MRSA5B", "MNPR3", "BGIP3", "CEDO4",
    "CEBR3", "BSLI3", "RPAD6", "CTSA3", "CGAS5", "CLSC3", "AHEB5", "BMEB3", "CTKA4", "MWET4",
    "HETA4", "DOHL4", "ESTR4", "BIOM11", "BMKS3", "CGRA3", "AFLT3", "NORD3", "TKNO4", "UNIP5",
    "BDLL3", "ENMT3", "HBTS5", "GPAR3", "JOPA3", "PINE11", "PSVM11", "CEDO3", "BALM4", "BRKM6",
    "BRSR5", "BDLL4", "HOOT4", "EQMA3B", "FESA3", "CPLE5", "ENMT4", "MRSA6B", "MTSA3", "PATI3",
    "MERC4", "WLMM3", "BALM3", "EQPA5", "MRSA3B", "CGAS3", "DOHL3", "MAPT4", "CTKA3", "DTCY3",
    "TKNO3",
];

/// The built-in ticker universe, deduplicated in first-seen order.
pub fn default_tickers() -> Vec<String> {
    let tickers = dedup(B3_TICKERS.iter().map(|t| t.to_string()));
    info!("Using built-in list of {} B3 tickers", tickers.len());
    let sample: Vec<&str> = tickers.iter().take(10).map(String::as_str).collect();
    info!("Ticker sample: {}", sample.join(", "));
    tickers
}

/// Parse a ticker list.
///
/// Accepts tickers separated by commas, whitespace or newlines; `#` starts a
/// comment running to the end of the line. Symbols are upper-cased and a
/// trailing `.SA` is removed. Malformed symbols are skipped with a warning.
pub fn parse_ticker_list(text: &str) -> Vec<String> {
    let candidates = text
        .lines()
        .map(|line| line.split('#').next().unwrap_or_default())
        .flat_map(|line| line.split(|c: char| c == ',' || c.is_whitespace()))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .filter_map(|token| {
            let normalized = normalize_ticker(token);
            if is_valid_ticker(&normalized) {
                Some(normalized)
            } else {
                warn!("Ignoring malformed ticker: {}", token);
                None
            }
        });

    dedup(candidates)
}

/// Load a ticker list from a file (see [`parse_ticker_list`] for the format).
pub fn load_tickers_file(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read tickers file {}", path.display()))?;
    let tickers = parse_ticker_list(&content);
    info!("Loaded {} tickers from {}", tickers.len(), path.display());
    Ok(tickers)
}

/// Yahoo Finance symbol for a B3 ticker: `PETR4` -> `PETR4.SA`.
pub fn yahoo_symbol(ticker: &str) -> String {
    format!("{}{}", ticker, YAHOO_SUFFIX)
}

fn normalize_ticker(token: &str) -> String {
    let upper = token.to_ascii_uppercase();
    match upper.strip_suffix(YAHOO_SUFFIX) {
        Some(stripped) => stripped.to_string(),
        None => upper,
    }
}

/// B3 codes: a four character root starting with a letter (`PETR`, `B3SA`),
/// a one or two digit class (`4`, `11`) and an optional lot suffix letter
/// (`MRSA5B`).
pub fn is_valid_ticker(ticker: &str) -> bool {
    let bytes = ticker.as_bytes();
    if bytes.len() < 5 || bytes.len() > 7 {
        return false;
    }
    let (root, rest) = bytes.split_at(4);
    if !root[0].is_ascii_uppercase() || !root.iter().all(|b| b.is_ascii_alphanumeric()) {
        return false;
    }

    let rest = match rest.last() {
        Some(last) if last.is_ascii_uppercase() => &rest[..rest.len() - 1],
        _ => rest,
    };
    (1..=2).contains(&rest.len()) && rest.iter().all(u8::is_ascii_digit)
}

fn dedup(tickers: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    tickers.filter(|t| seen.insert(t.clone())).collect()
}
