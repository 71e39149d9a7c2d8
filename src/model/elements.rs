// src/model/elements.rs

/// Element symbols indexed by atomic number minus one.
const SYMBOLS: [&str; 118] = [
    // --- Period 1 ---
    "H", "He",
    // --- Period 2 ---
    "Li", "Be", "B", "C", "N", "O", "F", "Ne",
    // --- Period 3 ---
    "Na", "Mg", "Al", "Si", "P", "S", "Cl", "Ar",
    // --- Period 4 ---
    "K", "Ca", "Sc", "Ti", "V", "Cr", "Mn", "Fe", "Co", "Ni", "Cu", "Zn", "Ga", "Ge", "As", "Se",
    "Br", "Kr",
    // --- Period 5 ---
    "Rb", "Sr", "Y", "Zr", "Nb", "Mo", "Tc", "Ru", "Rh", "Pd", "Ag", "Cd", "In", "Sn", "Sb", "Te",
    "I", "Xe",
    // --- Period 6 ---
    "Cs", "Ba", "La", "Ce", "Pr", "Nd", "Pm", "Sm", "Eu", "Gd", "Tb", "Dy", "Ho", "Er", "Tm", "Yb",
    "Lu", "Hf", "Ta", "W", "Re", "Os", "Ir", "Pt", "Au", "Hg", "Tl", "Pb", "Bi", "Po", "At", "Rn",
    // --- Period 7 ---
    "Fr", "Ra", "Ac", "Th", "Pa", "U", "Np", "Pu", "Am", "Cm", "Bk", "Cf", "Es", "Fm", "Md", "No",
    "Lr", "Rf", "Db", "Sg", "Bh", "Hs", "Mt", "Ds", "Rg", "Cn", "Nh", "Fl", "Mc", "Lv", "Ts", "Og",
];

/// Returns the atomic number (Z) for an element symbol or a site label
/// such as "Fe1", "O2-" or "FE". Unknown symbols give None.
pub fn atomic_number(element: &str) -> Option<u32> {
    let letters: String = element
        .chars()
        .skip_while(|c| !c.is_ascii_alphabetic())
        .take_while(|c| c.is_ascii_alphabetic())
        .collect();

    let mut chars = letters.chars();
    let first = chars.next()?.to_ascii_uppercase();
    let rest: String = chars.map(|c| c.to_ascii_lowercase()).collect();

    // Two-letter match first ("Co" before "C"), then the bare first letter
    // for labels like "Cw" or "Oh" that only carry one real symbol letter.
    let two: String = std::iter::once(first).chain(rest.chars().take(1)).collect();
    lookup(&two).or_else(|| lookup(&first.to_string()))
}

/// Returns the symbol for an atomic number, if it is in 1..=118.
pub fn symbol(z: u32) -> Option<&'static str> {
    let idx = (z as usize).checked_sub(1)?;
    SYMBOLS.get(idx).copied()
}

fn lookup(sym: &str) -> Option<u32> {
    SYMBOLS
        .iter()
        .position(|s| *s == sym)
        .map(|i| i as u32 + 1)
}
