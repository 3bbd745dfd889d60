// src/conversion.rs
//
// Lecture et affichage des littéraux dans la base du contexte.
// - analyser : signe, chiffres entiers, point radix, chiffres de fraction,
//   marqueur d'exposant avec signe et chiffres (tout dans la base courante,
//   replié par multiplications-additions successives)
// - formater : division longue exacte -> `precision` chiffres significatifs,
//   arrondi du dernier chiffre moitié loin de zéro, notation exposant selon
//   le mode, mantisse minimale (zéros de queue coupés)
// Le moteur ne voit que '.' : les séparateurs localisés appartiennent à la
// couche d'affichage, jamais à la représentation interne.

use std::cmp::Ordering;

use crate::contexte::Contexte;
use crate::erreur::{ErreurCalc, Resultat};
use crate::nombre::Nombre;
use crate::rationnel::Rationnel;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModeAffichage {
    Fixe,
    Scientifique,
    Ingenieur,
}

/// Borne sur la magnitude d'un exposant explicite dans un littéral.
const EXPOSANT_LITTERAL_MAX: u64 = 1 << 20;

/* ------------------------ Lecture ------------------------ */

/// Construit un rationnel exact depuis un littéral dans la base du contexte.
pub fn analyser(litteral: &str, ctx: &Contexte) -> Resultat<Rationnel> {
    let base = ctx.base();
    let chars: Vec<char> = litteral.trim().chars().collect();
    let mut i: usize = 0;

    if chars.is_empty() {
        return Err(ErreurCalc::Syntaxe("entrée vide".into()));
    }

    // signe
    let mut negatif = false;
    if chars[i] == '+' || chars[i] == '-' {
        negatif = chars[i] == '-';
        i += 1;
    }

    // mantisse : chiffres entiers, point optionnel, chiffres de fraction
    let mut mantisse = Nombre::zero();
    let mut nb_chiffres = 0usize;
    let mut chiffres_fraction = 0usize;
    let mut point_vu = false;

    while i < chars.len() {
        let c = chars[i];

        if c == '.' {
            if point_vu {
                return Err(ErreurCalc::Syntaxe("point radix répété".into()));
            }
            point_vu = true;
            i += 1;
            continue;
        }

        if est_marqueur_exposant(c, base) {
            break;
        }

        match valeur_chiffre(c, base) {
            Some(v) => {
                mantisse = mantisse
                    .multiplier_petit(base)?
                    .ajouter(&Nombre::de_u32(v))?;
                nb_chiffres += 1;
                if point_vu {
                    chiffres_fraction += 1;
                }
                i += 1;
            }
            None => {
                return Err(ErreurCalc::Syntaxe(format!(
                    "caractère inattendu: '{c}' (base {base})"
                )));
            }
        }
    }

    if nb_chiffres == 0 {
        return Err(ErreurCalc::Syntaxe("mantisse vide".into()));
    }

    // exposant optionnel, chiffres dans la base courante
    let mut exposant: i64 = 0;
    if i < chars.len() {
        i += 1; // marqueur
        let mut exp_negatif = false;
        if i < chars.len() && (chars[i] == '+' || chars[i] == '-') {
            exp_negatif = chars[i] == '-';
            i += 1;
        }
        let mut grandeur: u64 = 0;
        let mut nb = 0usize;
        while i < chars.len() {
            let c = chars[i];
            let v = valeur_chiffre(c, base)
                .ok_or_else(|| ErreurCalc::Syntaxe(format!("exposant invalide: '{c}'")))?;
            grandeur = grandeur * base as u64 + v as u64;
            if grandeur > EXPOSANT_LITTERAL_MAX {
                return Err(ErreurCalc::Debordement);
            }
            nb += 1;
            i += 1;
        }
        if nb == 0 {
            return Err(ErreurCalc::Syntaxe("exposant vide".into()));
        }
        exposant = if exp_negatif {
            -(grandeur as i64)
        } else {
            grandeur as i64
        };
    }

    let mut num = if negatif {
        mantisse.negation()
    } else {
        mantisse
    };
    let mut den = Nombre::puissance_u32(base, chiffres_fraction as u64)?;

    if exposant > 0 {
        num = num.multiplier(&Nombre::puissance_u32(base, exposant as u64)?)?;
    } else if exposant < 0 {
        den = den.multiplier(&Nombre::puissance_u32(base, exposant.unsigned_abs())?)?;
    }

    Rationnel::nouveau(num, den)?.reduire()
}

fn valeur_chiffre(c: char, base: u32) -> Option<u32> {
    let v = match c {
        '0'..='9' => c as u32 - '0' as u32,
        'a'..='z' => c as u32 - 'a' as u32 + 10,
        'A'..='Z' => c as u32 - 'A' as u32 + 10,
        _ => return None,
    };
    (v < base).then_some(v)
}

/// En base >= 15, 'e' est un chiffre : seul '^' marque l'exposant.
fn est_marqueur_exposant(c: char, base: u32) -> bool {
    c == '^' || (base <= 14 && (c == 'e' || c == 'E'))
}

fn marqueur_exposant(base: u32) -> char {
    if base <= 14 {
        'e'
    } else {
        '^'
    }
}

/* ------------------------ Affichage ------------------------ */

/// Rend exactement `precision` chiffres significatifs dans la base du
/// contexte, arrondis moitié loin de zéro, puis choisit la notation.
pub fn formater(valeur: &Rationnel, mode: ModeAffichage, ctx: &Contexte) -> Resultat<String> {
    let v = valeur.reduire()?;
    if v.est_zero() {
        // zéro exact : jamais de signe, jamais d'exposant
        return Ok("0".to_string());
    }

    let base = ctx.base();
    let p = ctx.precision();
    let negatif = v.est_negatif();
    let v = v.abs();

    // e tel que v ∈ [base^e, base^(e+1))
    let mut e = exposant_radix(&v, base)?;

    // arrondi( v · base^(p-1-e) ) : exactement p chiffres, sauf retenue
    let k = p as i64 - 1 - e;
    let (num_s, den_s) = if k >= 0 {
        (
            v.numerateur()
                .multiplier(&Nombre::puissance_u32(base, k as u64)?)?,
            v.denominateur().clone(),
        )
    } else {
        (
            v.numerateur().clone(),
            v.denominateur()
                .multiplier(&Nombre::puissance_u32(base, k.unsigned_abs())?)?,
        )
    };
    let (mut entier, reste) = num_s.div_rem(&den_s)?;
    let double = reste.multiplier_petit(2)?;
    if double.comparer_magnitude(&den_s) != Ordering::Less {
        entier = entier.ajouter(&Nombre::un())?;
    }

    let mut chiffres = chiffres_radix(&entier, base)?;
    if chiffres.len() == p + 1 {
        // retenue d'arrondi (base^p) : le chiffre de poids faible est un 0
        chiffres.remove(0);
        e += 1;
    }
    chiffres.reverse(); // poids fort d'abord

    let plein = matches!(mode, ModeAffichage::Fixe) && e >= -(p as i64) && e <= p as i64 - 1;

    let texte = match mode {
        ModeAffichage::Fixe if plein => rendu_plein(&chiffres, e),
        ModeAffichage::Ingenieur => rendu_exposant(&chiffres, e, base, 3),
        _ => rendu_exposant(&chiffres, e, base, 1),
    };

    Ok(if negatif { format!("-{texte}") } else { texte })
}

/// e tel que v ∈ [base^e, base^(e+1)), pour v > 0.
fn exposant_radix(v: &Rationnel, base: u32) -> Resultat<i64> {
    let num = v.numerateur();
    let den = v.denominateur();
    if num.comparer_magnitude(den) != Ordering::Less {
        // partie entière non nulle : compter ses chiffres radix
        let (q, _) = num.div_rem(den)?;
        Ok(chiffres_radix(&q, base)?.len() as i64 - 1)
    } else {
        // v < 1 : multiplier par la base jusqu'à atteindre 1
        let mut e: i64 = -1;
        let mut courant = num.multiplier_petit(base)?;
        let mut garde = den.nb_bits() - num.nb_bits() + 8;
        while courant.comparer_magnitude(den) == Ordering::Less {
            courant = courant.multiplier_petit(base)?;
            e -= 1;
            garde -= 1;
            if garde < 0 {
                return Err(ErreurCalc::Debordement);
            }
        }
        Ok(e)
    }
}

/// Chiffres radix de |n|, poids faible d'abord.
fn chiffres_radix(n: &Nombre, base: u32) -> Resultat<Vec<u32>> {
    let mut v = Vec::new();
    let mut q = n.abs();
    while !q.est_zero() {
        let (suivant, r) = q.div_rem_petit(base)?;
        v.push(r);
        q = suivant;
    }
    if v.is_empty() {
        v.push(0);
    }
    Ok(v)
}

fn chiffre_en_char(v: u32) -> char {
    if v < 10 {
        (b'0' + v as u8) as char
    } else {
        (b'A' + (v - 10) as u8) as char
    }
}

/// Notation pleine : chiffres (poids fort d'abord) autour du point.
fn rendu_plein(chiffres: &[u32], e: i64) -> String {
    let mut s = String::new();
    if e >= 0 {
        let ent = (e + 1) as usize; // chiffres entiers (<= chiffres.len() par la fenêtre)
        for (idx, &c) in chiffres.iter().enumerate() {
            if idx == ent {
                s.push('.');
            }
            s.push(chiffre_en_char(c));
        }
        if s.contains('.') {
            couper_zeros(&mut s);
        }
    } else {
        s.push_str("0.");
        for _ in 0..(-e - 1) {
            s.push('0');
        }
        for &c in chiffres {
            s.push(chiffre_en_char(c));
        }
        couper_zeros(&mut s);
    }
    s
}

/// Notation exposant : partie entière de 1..=groupe chiffres, exposant
/// multiple de `groupe`, rendu dans la base courante et omis s'il est nul.
fn rendu_exposant(chiffres: &[u32], e: i64, base: u32, groupe: i64) -> String {
    let e_affiche = div_vers_bas(e, groupe) * groupe;
    let ent = (e - e_affiche + 1) as usize;
    let mut s = String::new();
    for idx in 0..ent.max(chiffres.len()) {
        if idx == ent {
            s.push('.');
        }
        let c = chiffres.get(idx).copied().unwrap_or(0);
        s.push(chiffre_en_char(c));
    }
    if s.contains('.') {
        couper_zeros(&mut s);
    }
    if e_affiche != 0 {
        s.push(marqueur_exposant(base));
        s.push_str(&rendu_exposant_entier(e_affiche, base));
    }
    s
}

fn rendu_exposant_entier(e: i64, base: u32) -> String {
    let mut s = String::new();
    if e < 0 {
        s.push('-');
    }
    let mut v = e.unsigned_abs();
    let mut chiffres = Vec::new();
    loop {
        chiffres.push((v % base as u64) as u32);
        v /= base as u64;
        if v == 0 {
            break;
        }
    }
    for &c in chiffres.iter().rev() {
        s.push(chiffre_en_char(c));
    }
    s
}

/// Coupe les zéros de fraction (ne s'applique que si un point est présent).
fn couper_zeros(s: &mut String) {
    while s.ends_with('0') {
        s.pop();
    }
    if s.ends_with('.') {
        s.pop();
    }
}

fn div_vers_bas(a: i64, b: i64) -> i64 {
    let q = a / b;
    if a % b != 0 && (a < 0) != (b < 0) {
        q - 1
    } else {
        q
    }
}

/* ------------------------ Tests unitaires ------------------------ */
