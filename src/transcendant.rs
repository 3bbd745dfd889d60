// src/transcendant.rs
//
// Fonctions transcendantes sur Rationnel : séries convergentes et
// itérations, entièrement en arithmétique rationnelle.
// - précision interne élargie (garde), troncature à chaque pas
// - réduction d'argument avant chaque série
// - arrêt : |terme| négligeable devant |somme| à B^-m près ; plafond dur
//   d'itérations sinon Debordement (jamais de valeur non convergée)
// - les violations de domaine sont signalées avant tout travail de série
// - la trig consomme l'unité d'angle du contexte : conversion en radians à
//   l'entrée, retour dans l'unité pour les fonctions inverses

use std::cmp::Ordering;

use crate::contexte::Contexte;
use crate::erreur::{ErreurCalc, Resultat};
use crate::nombre::Nombre;
use crate::rationnel::Rationnel;

/// Borne sur le multiple entier extrait par une réduction d'argument.
const REDUCTION_MAX: u64 = 500_000;

/// Borne sur l'itération de Newton (racine carrée).
const PLAFOND_NEWTON: usize = 1_000;

/// Borne sur n! (la borne dure des mantisses coupe bien avant l'infini).
const FACTORIELLE_MAX: u64 = 100_000;

/// Plafond de termes d'une série, proportionné à la précision interne.
fn plafond_termes(m: usize) -> usize {
    64 + 16 * m
}

/* ------------------------ Exponentielle et logarithmes ------------------------ */

/// exp(x). Réduction : x = k·ln2 + r, exp(x) = 2^k · exp(r).
pub fn exp(x: &Rationnel, ctx: &Contexte) -> Resultat<Rationnel> {
    if x.est_zero() {
        // identité exacte, pas de série
        return Ok(Rationnel::un());
    }
    let m = ctx.chiffres_internes();
    let ln2 = ctx.ln2()?;
    let k = x.diviser(&ln2)?.arrondi_entier()?;
    let k_i = k.en_i64().ok_or(ErreurCalc::Debordement)?;
    if k_i.unsigned_abs() > REDUCTION_MAX {
        return Err(ErreurCalc::Debordement);
    }
    let r = x
        .soustraire(&Rationnel::entier(k_i).multiplier(&ln2)?)?
        .tronquer(m);
    let s = serie_exp(&r, ctx)?;
    let facteur = Rationnel::entier(2).puissance_entiere(k_i)?;
    Ok(s.multiplier(&facteur)?.tronquer(m))
}

/// ln(x), x > 0. Réduction par puissances de deux vers [3/4, 3/2), puis
/// ln(t) = 2·atanh((t-1)/(t+1)).
pub fn ln(x: &Rationnel, ctx: &Contexte) -> Resultat<Rationnel> {
    if x.est_zero() || x.est_negatif() {
        return Err(ErreurCalc::Domaine(
            "logarithme d'un argument non strictement positif".into(),
        ));
    }
    let m = ctx.chiffres_internes();

    let mut k = x.numerateur().nb_bits() - x.denominateur().nb_bits();
    let mut t = x.diviser(&Rationnel::entier(2).puissance_entiere(k)?)?;
    let deux = Rationnel::entier(2);
    let trois_demis = Rationnel::fraction(3, 2)?;
    let trois_quarts = Rationnel::fraction(3, 4)?;
    while t.comparer(&trois_demis)? != Ordering::Less {
        t = t.diviser(&deux)?;
        k += 1;
    }
    while t.comparer(&trois_quarts)? == Ordering::Less {
        t = t.multiplier(&deux)?;
        k -= 1;
    }
    let t = t.tronquer(m);

    let un = Rationnel::un();
    let z = t.soustraire(&un)?.diviser(&t.ajouter(&un)?)?.tronquer(m);
    let ln_t = serie_atanh(&z, ctx)?.multiplier(&deux)?;

    if k == 0 {
        return Ok(ln_t.tronquer(m));
    }
    let ln2 = ctx.ln2()?;
    Ok(ln_t
        .ajouter(&Rationnel::entier(k).multiplier(&ln2)?)?
        .tronquer(m))
}

/// log10(x) = ln(x)/ln(10). En base 10, ln(base) est déjà en cache.
pub fn log10(x: &Rationnel, ctx: &Contexte) -> Resultat<Rationnel> {
    let ln_x = ln(x, ctx)?;
    let ln_dix = if ctx.base() == 10 {
        ctx.ln_base()?
    } else {
        ln(&Rationnel::entier(10), ctx)?
    };
    Ok(ln_x.diviser(&ln_dix)?.tronquer(ctx.chiffres_internes()))
}

/* ------------------------ Trigonométrie ------------------------ */

pub fn sin(x: &Rationnel, ctx: &Contexte) -> Resultat<Rationnel> {
    let r = reduire_angle(&en_radians(x, ctx)?, ctx)?;
    let rr = r.multiplier(&r)?.negation().tronquer(ctx.chiffres_internes());
    serie_impaire(&r, &rr, ctx)
}

pub fn cos(x: &Rationnel, ctx: &Contexte) -> Resultat<Rationnel> {
    let r = reduire_angle(&en_radians(x, ctx)?, ctx)?;
    let rr = r.multiplier(&r)?.negation().tronquer(ctx.chiffres_internes());
    serie_paire(&rr, ctx)
}

/// tan = sin/cos ; cos sous la tolérance utilisateur => multiple impair
/// de π/2, hors domaine.
pub fn tan(x: &Rationnel, ctx: &Contexte) -> Resultat<Rationnel> {
    let m = ctx.chiffres_internes();
    let r = reduire_angle(&en_radians(x, ctx)?, ctx)?;
    let rr = r.multiplier(&r)?.negation().tronquer(m);
    let c = serie_paire(&rr, ctx)?;
    if c.abs().comparer(&ctx.tolerance()?)? != Ordering::Greater {
        return Err(ErreurCalc::Domaine(
            "tangente en un multiple impair de π/2".into(),
        ));
    }
    let s = serie_impaire(&r, &rr, ctx)?;
    Ok(s.diviser(&c)?.tronquer(m))
}

pub fn atan(x: &Rationnel, ctx: &Contexte) -> Resultat<Rationnel> {
    depuis_radians(&atan_radians(x, ctx)?, ctx)
}

pub fn asin(x: &Rationnel, ctx: &Contexte) -> Resultat<Rationnel> {
    depuis_radians(&asin_radians(x, ctx)?, ctx)
}

pub fn acos(x: &Rationnel, ctx: &Contexte) -> Resultat<Rationnel> {
    let un = Rationnel::un();
    if x.abs().comparer(&un)? == Ordering::Greater {
        return Err(ErreurCalc::Domaine("arc cosinus hors de [-1, 1]".into()));
    }
    let m = ctx.chiffres_internes();
    let demi_pi = ctx.pi()?.diviser(&Rationnel::entier(2))?;
    let r = demi_pi.soustraire(&asin_radians(x, ctx)?)?.tronquer(m);
    depuis_radians(&r, ctx)
}

fn atan_radians(x: &Rationnel, ctx: &Contexte) -> Resultat<Rationnel> {
    if x.est_negatif() {
        // symétrie impaire
        return Ok(atan_radians(&x.abs(), ctx)?.negation());
    }
    if x.est_zero() {
        return Ok(Rationnel::zero());
    }
    let m = ctx.chiffres_internes();
    let un = Rationnel::un();
    if x.comparer(&un)? == Ordering::Greater {
        // atan(x) = π/2 − atan(1/x)
        let demi_pi = ctx.pi()?.diviser(&Rationnel::entier(2))?;
        return Ok(demi_pi
            .soustraire(&atan_radians(&x.inverse()?, ctx)?)?
            .tronquer(m));
    }
    if x.comparer(&Rationnel::fraction(1, 2)?)? == Ordering::Greater {
        // atan(x) = π/4 + atan((x−1)/(x+1)), argument ramené sous 1/3
        let quart_pi = ctx.pi()?.diviser(&Rationnel::entier(4))?;
        let z = x.soustraire(&un)?.diviser(&x.ajouter(&un)?)?.tronquer(m);
        return Ok(quart_pi.ajouter(&atan_radians(&z, ctx)?)?.tronquer(m));
    }
    serie_atan(&x.tronquer(m), ctx)
}

fn asin_radians(x: &Rationnel, ctx: &Contexte) -> Resultat<Rationnel> {
    let un = Rationnel::un();
    match x.abs().comparer(&un)? {
        Ordering::Greater => Err(ErreurCalc::Domaine("arc sinus hors de [-1, 1]".into())),
        Ordering::Equal => {
            let demi_pi = ctx.pi()?.diviser(&Rationnel::entier(2))?;
            Ok(if x.est_negatif() {
                demi_pi.negation()
            } else {
                demi_pi
            })
        }
        Ordering::Less => {
            // asin(x) = atan(x / √(1−x²))
            let m = ctx.chiffres_internes();
            let racine = racine_carree(&un.soustraire(&x.multiplier(x)?)?, ctx)?;
            if racine.est_zero() {
                // |x| collé à 1 sous la résolution interne
                let demi_pi = ctx.pi()?.diviser(&Rationnel::entier(2))?;
                return Ok(if x.est_negatif() {
                    demi_pi.negation()
                } else {
                    demi_pi
                });
            }
            atan_radians(&x.diviser(&racine)?.tronquer(m), ctx)
        }
    }
}

/* ------------------------ Hyperboliques ------------------------ */

/// sinh : série pour |x| <= 1 (évite l'annulation), exponentielles sinon.
pub fn sinh(x: &Rationnel, ctx: &Contexte) -> Resultat<Rationnel> {
    let m = ctx.chiffres_internes();
    if x.abs().comparer(&Rationnel::un())? != Ordering::Greater {
        let xx = x.multiplier(x)?.tronquer(m);
        return serie_impaire(&x.tronquer(m), &xx, ctx);
    }
    let ex = exp(x, ctx)?;
    Ok(ex
        .soustraire(&ex.inverse()?)?
        .diviser(&Rationnel::entier(2))?
        .tronquer(m))
}

pub fn cosh(x: &Rationnel, ctx: &Contexte) -> Resultat<Rationnel> {
    let m = ctx.chiffres_internes();
    let ex = exp(x, ctx)?;
    Ok(ex
        .ajouter(&ex.inverse()?)?
        .diviser(&Rationnel::entier(2))?
        .tronquer(m))
}

/// tanh = sinh/cosh (cosh >= 1, jamais nul).
pub fn tanh(x: &Rationnel, ctx: &Contexte) -> Resultat<Rationnel> {
    let s = sinh(x, ctx)?;
    let c = cosh(x, ctx)?;
    Ok(s.diviser(&c)?.tronquer(ctx.chiffres_internes()))
}

pub fn asinh(x: &Rationnel, ctx: &Contexte) -> Resultat<Rationnel> {
    if x.est_negatif() {
        // symétrie impaire : évite l'annulation dans x + √(x²+1)
        return Ok(asinh(&x.abs(), ctx)?.negation());
    }
    let m = ctx.chiffres_internes();
    let un = Rationnel::un();
    let racine = racine_carree(&x.multiplier(x)?.ajouter(&un)?, ctx)?;
    ln(&x.ajouter(&racine)?.tronquer(m), ctx)
}

pub fn acosh(x: &Rationnel, ctx: &Contexte) -> Resultat<Rationnel> {
    let un = Rationnel::un();
    if x.comparer(&un)? == Ordering::Less {
        return Err(ErreurCalc::Domaine(
            "arc cosinus hyperbolique d'un argument < 1".into(),
        ));
    }
    let m = ctx.chiffres_internes();
    let racine = racine_carree(&x.multiplier(x)?.soustraire(&un)?, ctx)?;
    ln(&x.ajouter(&racine)?.tronquer(m), ctx)
}

pub fn atanh(x: &Rationnel, ctx: &Contexte) -> Resultat<Rationnel> {
    let un = Rationnel::un();
    if x.abs().comparer(&un)? != Ordering::Less {
        return Err(ErreurCalc::Domaine(
            "arc tangente hyperbolique hors de ]-1, 1[".into(),
        ));
    }
    let m = ctx.chiffres_internes();
    let rapport = un.ajouter(x)?.diviser(&un.soustraire(x)?)?.tronquer(m);
    Ok(ln(&rapport, ctx)?.diviser(&Rationnel::entier(2))?.tronquer(m))
}

/* ------------------------ Racine, puissance, factorielle ------------------------ */

/// √x par Newton sur entiers scalés : y ≈ √(num/den)·B^m, ajusté au
/// plancher, résultat y/B^m.
pub fn racine_carree(x: &Rationnel, ctx: &Contexte) -> Resultat<Rationnel> {
    if x.est_negatif() {
        return Err(ErreurCalc::Domaine(
            "racine carrée d'un argument négatif".into(),
        ));
    }
    if x.est_zero() {
        return Ok(Rationnel::zero());
    }
    let m = ctx.chiffres_internes();
    let x = x.tronquer(m);
    let num = x.numerateur().abs();
    let den = x.denominateur().clone();

    // cible : y² ≈ num·B^(2m)/den
    let cible = num.decaler(2 * m as i64)?;

    // départ au-dessus de la racine : 2^(bits/2 + 1)
    let bits = (cible.nb_bits() - den.nb_bits()).max(0);
    let mut y = Nombre::un().decaler_bits((bits / 2 + 1) as u64)?;
    let mut precedent = Nombre::zero();

    for _ in 0..PLAFOND_NEWTON {
        let (q, _) = cible.div_rem(&den.multiplier(&y)?)?;
        let (suivant, _) = y.ajouter(&q)?.div_rem_petit(2)?;
        if suivant.est_zero() {
            // racine sous la résolution du scalage : plancher nul
            return Ok(Rationnel::zero());
        }
        if suivant == y || suivant == precedent {
            // ajustement final (plancher)
            let mut r = suivant;
            loop {
                let plus = r.ajouter(&Nombre::un())?;
                if plus.multiplier(&plus)?.multiplier(&den)?.comparer(&cible) != Ordering::Greater {
                    r = plus;
                } else {
                    break;
                }
            }
            while r.multiplier(&r)?.multiplier(&den)?.comparer(&cible) == Ordering::Greater {
                r = r.soustraire(&Nombre::un())?;
            }
            return Rationnel::nouveau(r, Nombre::un().decaler(m as i64)?);
        }
        precedent = y;
        y = suivant;
    }
    Err(ErreurCalc::Debordement)
}

/// x^y : exposant entier exact, sinon exp(y·ln x) avec règles de domaine.
pub fn puissance(base: &Rationnel, exposant: &Rationnel, ctx: &Contexte) -> Resultat<Rationnel> {
    let exposant = exposant.reduire()?;
    if exposant.est_entier()? {
        let k = exposant
            .partie_entiere()?
            .en_i64()
            .ok_or(ErreurCalc::Debordement)?;
        if base.est_zero() {
            if k < 0 {
                return Err(ErreurCalc::DivisionParZero);
            }
            return Ok(if k == 0 {
                Rationnel::un()
            } else {
                Rationnel::zero()
            });
        }
        return base.puissance_entiere(k);
    }
    if base.est_zero() {
        if exposant.est_negatif() {
            return Err(ErreurCalc::DivisionParZero);
        }
        return Ok(Rationnel::zero());
    }
    if base.est_negatif() {
        return Err(ErreurCalc::Domaine(
            "puissance non entière d'une base négative".into(),
        ));
    }
    let m = ctx.chiffres_internes();
    exp(&exposant.multiplier(&ln(base, ctx)?)?.tronquer(m), ctx)
}

/// n! sur les entiers (Nombre), n >= 0.
pub fn factorielle(x: &Rationnel) -> Resultat<Rationnel> {
    let x = x.reduire()?;
    if x.est_negatif() || !x.est_entier()? {
        return Err(ErreurCalc::Domaine(
            "factorielle d'un argument non entier ou négatif".into(),
        ));
    }
    let n = x.partie_entiere()?.en_u64().ok_or(ErreurCalc::Debordement)?;
    if n > FACTORIELLE_MAX {
        return Err(ErreurCalc::Debordement);
    }
    let mut acc = Nombre::un();
    for i in 2..=n {
        acc = acc.multiplier_petit(i as u32)?;
    }
    Ok(Rationnel::de_nombre(acc))
}

/* ------------------------ Constantes (appelées par le cache) ------------------------ */

/// π par l'identité de Machin : 16·atan(1/5) − 4·atan(1/239).
pub(crate) fn calculer_pi(ctx: &Contexte) -> Resultat<Rationnel> {
    let a = serie_atan(&Rationnel::fraction(1, 5)?, ctx)?;
    let b = serie_atan(&Rationnel::fraction(1, 239)?, ctx)?;
    a.multiplier(&Rationnel::entier(16))?
        .soustraire(&b.multiplier(&Rationnel::entier(4))?)
}

/// e par la série exponentielle en 1 (aucune réduction nécessaire).
pub(crate) fn calculer_e(ctx: &Contexte) -> Resultat<Rationnel> {
    serie_exp(&Rationnel::un(), ctx)
}

/// ln 2 = 2·atanh(1/3).
pub(crate) fn calculer_ln2(ctx: &Contexte) -> Resultat<Rationnel> {
    serie_atanh(&Rationnel::fraction(1, 3)?, ctx)?.multiplier(&Rationnel::entier(2))
}

/// ln(base) via le logarithme général (ln 2 passe par le cache).
pub(crate) fn calculer_ln_base(ctx: &Contexte) -> Resultat<Rationnel> {
    ln(&Rationnel::entier(ctx.base() as i64), ctx)
}

/* ------------------------ Noyaux de séries ------------------------ */

/// Vrai quand |terme| est négligeable devant |somme| à la tolérance près.
fn converge(terme: &Rationnel, somme: &Rationnel, seuil: &Rationnel) -> Resultat<bool> {
    if terme.est_zero() {
        return Ok(true);
    }
    if somme.est_zero() {
        return Ok(terme.abs().comparer(seuil)? != Ordering::Greater);
    }
    let borne = somme.abs().multiplier(seuil)?;
    Ok(terme.abs().comparer(&borne)? != Ordering::Greater)
}

/// Σ r^n/n! (série exponentielle, |r| petit après réduction).
fn serie_exp(r: &Rationnel, ctx: &Contexte) -> Resultat<Rationnel> {
    let m = ctx.chiffres_internes();
    let seuil = ctx.tolerance_interne()?;
    let mut somme = Rationnel::un();
    let mut terme = Rationnel::un();
    for n in 1..=plafond_termes(m) {
        terme = terme
            .multiplier(r)?
            .diviser(&Rationnel::entier(n as i64))?
            .tronquer(m);
        somme = somme.ajouter(&terme)?.tronquer(m);
        if converge(&terme, &somme, &seuil)? {
            return Ok(somme);
        }
    }
    Err(ErreurCalc::Debordement)
}

/// Σ impair : t ← t·q/((n+1)(n+2)) à partir de t = r.
/// sin avec q = −r², sinh avec q = r².
fn serie_impaire(r: &Rationnel, q: &Rationnel, ctx: &Contexte) -> Resultat<Rationnel> {
    if r.est_zero() {
        return Ok(Rationnel::zero());
    }
    let m = ctx.chiffres_internes();
    let seuil = ctx.tolerance_interne()?;
    let mut terme = r.clone();
    let mut somme = r.clone();
    let mut n: i64 = 1;
    for _ in 0..plafond_termes(m) {
        terme = terme
            .multiplier(q)?
            .diviser(&Rationnel::entier((n + 1) * (n + 2)))?
            .tronquer(m);
        n += 2;
        somme = somme.ajouter(&terme)?.tronquer(m);
        if converge(&terme, &somme, &seuil)? {
            return Ok(somme);
        }
    }
    Err(ErreurCalc::Debordement)
}

/// Σ pair : t ← t·q/((n+1)(n+2)) à partir de t = 1 (cos avec q = −r²).
fn serie_paire(q: &Rationnel, ctx: &Contexte) -> Resultat<Rationnel> {
    let m = ctx.chiffres_internes();
    let seuil = ctx.tolerance_interne()?;
    let mut terme = Rationnel::un();
    let mut somme = Rationnel::un();
    let mut n: i64 = 0;
    for _ in 0..plafond_termes(m) {
        terme = terme
            .multiplier(q)?
            .diviser(&Rationnel::entier((n + 1) * (n + 2)))?
            .tronquer(m);
        n += 2;
        somme = somme.ajouter(&terme)?.tronquer(m);
        if converge(&terme, &somme, &seuil)? {
            return Ok(somme);
        }
    }
    Err(ErreurCalc::Debordement)
}

/// atan(z) = z − z³/3 + z⁵/5 − ... (|z| <= 1/2 après réduction).
fn serie_atan(z: &Rationnel, ctx: &Contexte) -> Resultat<Rationnel> {
    if z.est_zero() {
        return Ok(Rationnel::zero());
    }
    let m = ctx.chiffres_internes();
    let seuil = ctx.tolerance_interne()?;
    let moins_zz = z.multiplier(z)?.negation().tronquer(m);
    let mut puissance = z.clone();
    let mut somme = z.clone();
    let mut n: i64 = 1;
    for _ in 0..plafond_termes(m) {
        puissance = puissance.multiplier(&moins_zz)?.tronquer(m);
        n += 2;
        let terme = puissance.diviser(&Rationnel::entier(n))?;
        somme = somme.ajouter(&terme)?.tronquer(m);
        if converge(&terme, &somme, &seuil)? {
            return Ok(somme);
        }
    }
    Err(ErreurCalc::Debordement)
}

/// atanh(z) = z + z³/3 + z⁵/5 + ... (|z| < 1, petit après réduction).
fn serie_atanh(z: &Rationnel, ctx: &Contexte) -> Resultat<Rationnel> {
    if z.est_zero() {
        return Ok(Rationnel::zero());
    }
    let m = ctx.chiffres_internes();
    let seuil = ctx.tolerance_interne()?;
    let zz = z.multiplier(z)?.tronquer(m);
    let mut puissance = z.clone();
    let mut somme = z.clone();
    let mut n: i64 = 1;
    for _ in 0..plafond_termes(m) {
        puissance = puissance.multiplier(&zz)?.tronquer(m);
        n += 2;
        let terme = puissance.diviser(&Rationnel::entier(n))?;
        somme = somme.ajouter(&terme)?.tronquer(m);
        if converge(&terme, &somme, &seuil)? {
            return Ok(somme);
        }
    }
    Err(ErreurCalc::Debordement)
}

/* ------------------------ Réduction d'angle ------------------------ */

fn en_radians(x: &Rationnel, ctx: &Contexte) -> Resultat<Rationnel> {
    match ctx.facteur_angle()? {
        Some(f) => Ok(x.multiplier(&f)?.tronquer(ctx.chiffres_internes())),
        None => Ok(x.clone()),
    }
}

fn depuis_radians(x: &Rationnel, ctx: &Contexte) -> Resultat<Rationnel> {
    match ctx.facteur_angle()? {
        Some(f) => Ok(x.diviser(&f)?.tronquer(ctx.chiffres_internes())),
        None => Ok(x.clone()),
    }
}

/// r = x − k·2π avec |r| proche de [−π, π] (k au plus proche).
fn reduire_angle(x: &Rationnel, ctx: &Contexte) -> Resultat<Rationnel> {
    let m = ctx.chiffres_internes();
    let deux_pi = ctx.pi()?.multiplier(&Rationnel::entier(2))?;
    let k = x.diviser(&deux_pi)?.arrondi_entier()?;
    if k.est_zero() {
        return Ok(x.tronquer(m));
    }
    let k_i = k.en_i64().ok_or(ErreurCalc::Debordement)?;
    if k_i.unsigned_abs() > REDUCTION_MAX {
        return Err(ErreurCalc::Debordement);
    }
    Ok(x
        .soustraire(&Rationnel::entier(k_i).multiplier(&deux_pi)?)?
        .tronquer(m))
}
