//! Tests fuzz safe : robustesse + déterminisme + oracle exact.
//!
//! But : marteler l'arithmétique sans brûler la machine.
//! - RNG déterministe (seed fixe)
//! - tailles bornées, budget temps global
//! - chaque opération est contre-vérifiée par l'oracle BigRational
//!   (même disposition de chiffres u32, poids faible d'abord)
//! - invariant clé : réduire ne change jamais la valeur

use std::time::{Duration, Instant};

use num_bigint::{BigInt, BigUint, Sign};
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};

use crate::contexte::Contexte;
use crate::conversion::{analyser, formater, ModeAffichage};
use crate::erreur::ErreurCalc;
use crate::nombre::Nombre;
use crate::rationnel::Rationnel;

/* ------------------------ RNG déterministe minimal ------------------------ */

#[derive(Clone)]
struct Rng {
    state: u64,
}
impl Rng {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }
    fn next_u32(&mut self) -> u32 {
        // LCG simple (déterministe)
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.state >> 32) as u32
    }
    fn pick(&mut self, n: u32) -> u32 {
        if n == 0 {
            0
        } else {
            self.next_u32() % n
        }
    }
    fn coin(&mut self) -> bool {
        (self.next_u32() & 1) == 1
    }
}

/* ------------------------ Budget anti-gel ------------------------ */

fn budget(depart: Instant, max: Duration) {
    if depart.elapsed() > max {
        panic!("budget temps dépassé: {max:?}");
    }
}

/* ------------------------ Oracle BigRational ------------------------ */

fn oracle_nombre(n: &Nombre) -> BigInt {
    let mantisse = BigUint::new(n.mantisse().to_vec());
    let mut v = BigInt::from_biguint(Sign::Plus, mantisse);
    v <<= 32usize * n.exposant() as usize;
    if n.signe() < 0 {
        v = -v;
    }
    v
}

fn oracle(r: &Rationnel) -> BigRational {
    BigRational::new(oracle_nombre(r.numerateur()), oracle_nombre(r.denominateur()))
}

/* ------------------------ Génération bornée ------------------------ */

fn gen_rationnel(rng: &mut Rng) -> Rationnel {
    let n = rng.pick(2001) as i64 - 1000;
    let d = rng.pick(99) as i64 + 1;
    let base = Rationnel::fraction(n, d).unwrap_or_else(|e| panic!("fraction: {e}"));
    if rng.coin() {
        // élargit les mantisses : grands entiers des deux côtés
        let k = rng.pick(4) as i64 + 1;
        let gros = Rationnel::fraction(1_000_003, 97)
            .unwrap()
            .puissance_entiere(k)
            .unwrap();
        base.multiplier(&gros).unwrap()
    } else {
        base
    }
}

/* ------------------------ Lois arithmétiques exactes ------------------------ */

#[test]
fn fuzz_lois_arithmetiques() {
    let t0 = Instant::now();
    let max = Duration::from_secs(10);
    let mut rng = Rng::new(0xC0FFEE_u64);

    for _ in 0..120 {
        budget(t0, max);
        let a = gen_rationnel(&mut rng);
        let b = gen_rationnel(&mut rng);
        let c = gen_rationnel(&mut rng);

        // commutativité (exacte, pas à tolérance près)
        assert!(a
            .ajouter(&b)
            .unwrap()
            .egal(&b.ajouter(&a).unwrap())
            .unwrap());
        assert!(a
            .multiplier(&b)
            .unwrap()
            .egal(&b.multiplier(&a).unwrap())
            .unwrap());

        // associativité
        let g = a.ajouter(&b).unwrap().ajouter(&c).unwrap();
        let d = a.ajouter(&b.ajouter(&c).unwrap()).unwrap();
        assert!(g.egal(&d).unwrap());
        let g = a.multiplier(&b).unwrap().multiplier(&c).unwrap();
        let d = a.multiplier(&b.multiplier(&c).unwrap()).unwrap();
        assert!(g.egal(&d).unwrap());

        // distributivité
        let g = a.multiplier(&b.ajouter(&c).unwrap()).unwrap();
        let d = a
            .multiplier(&b)
            .unwrap()
            .ajouter(&a.multiplier(&c).unwrap())
            .unwrap();
        assert!(g.egal(&d).unwrap());
    }
}

/* ------------------------ Oracle opération par opération ------------------------ */

#[test]
fn fuzz_oracle_operations() {
    let t0 = Instant::now();
    let max = Duration::from_secs(10);
    let mut rng = Rng::new(0xBADC0DE_u64);

    let mut divisions = 0usize;
    for _ in 0..150 {
        budget(t0, max);
        let a = gen_rationnel(&mut rng);
        let b = gen_rationnel(&mut rng);
        let oa = oracle(&a);
        let ob = oracle(&b);

        assert_eq!(oracle(&a.ajouter(&b).unwrap()), &oa + &ob);
        assert_eq!(oracle(&a.soustraire(&b).unwrap()), &oa - &ob);
        assert_eq!(oracle(&a.multiplier(&b).unwrap()), &oa * &ob);

        if b.est_zero() {
            assert_eq!(a.diviser(&b).unwrap_err(), ErreurCalc::DivisionParZero);
        } else {
            assert_eq!(oracle(&a.diviser(&b).unwrap()), &oa / &ob);
            divisions += 1;
        }

        // inverse : a · (1/a) = 1
        if !a.est_zero() {
            assert!(oracle(&a.multiplier(&a.inverse().unwrap()).unwrap()).is_one());
        }

        // comparaison de valeurs
        let attendu = oa.cmp(&ob);
        assert_eq!(a.comparer(&b).unwrap(), attendu);
    }
    assert!(divisions > 100, "trop peu de divisions exercées: {divisions}");
}

#[test]
fn fuzz_oracle_arrondis() {
    let t0 = Instant::now();
    let max = Duration::from_secs(10);
    let mut rng = Rng::new(0xFACADE_u64);

    for _ in 0..150 {
        budget(t0, max);
        let a = gen_rationnel(&mut rng);
        let oa = oracle(&a);

        // troncature vers zéro
        assert_eq!(
            oracle_nombre(&a.partie_entiere().unwrap()),
            oa.trunc().to_integer()
        );
        // arrondi moitié loin de zéro (même règle que BigRational::round)
        assert_eq!(
            oracle_nombre(&a.arrondi_entier().unwrap()),
            oa.round().to_integer()
        );
    }
}

/* ------------------------ Invariants de réduction ------------------------ */

#[test]
fn fuzz_reduction_invariants() {
    let t0 = Instant::now();
    let max = Duration::from_secs(10);
    let mut rng = Rng::new(0xDEC0DE_u64);

    for _ in 0..120 {
        budget(t0, max);
        let a = gen_rationnel(&mut rng);
        let reduit = a.reduire().unwrap();

        // dénominateur strictement positif et non nul
        assert!(!reduit.denominateur().est_zero());
        assert!(!reduit.denominateur().est_negatif());

        // numérateur et dénominateur premiers entre eux
        let g = reduit
            .numerateur()
            .pgcd(reduit.denominateur())
            .unwrap();
        if !reduit.est_zero() {
            assert!(g.est_un(), "PGCD non trivial après réduction");
        }

        // la valeur n'a pas bougé
        assert_eq!(oracle(&reduit), oracle(&a));
        // et l'oracle confirme le signe
        assert_eq!(reduit.est_negatif(), oracle(&a).is_negative());
    }
}

/* ------------------------ Aller-retour affichage/lecture ------------------------ */

#[test]
fn fuzz_aller_retour_affichage() {
    let t0 = Instant::now();
    let max = Duration::from_secs(15);
    let mut rng = Rng::new(0xCAFE_u64);

    let bases = [2u32, 3, 8, 10, 12, 16, 20, 36];
    for _ in 0..100 {
        budget(t0, max);
        let base = bases[rng.pick(bases.len() as u32) as usize];
        let c = Contexte::nouveau(base, 10).unwrap();
        let v = gen_rationnel(&mut rng);

        for mode in [
            ModeAffichage::Fixe,
            ModeAffichage::Scientifique,
            ModeAffichage::Ingenieur,
        ] {
            let s = formater(&v, mode, &c).unwrap();
            let relu = analyser(&s, &c).unwrap();
            // relire puis réafficher est un point fixe
            assert_eq!(
                formater(&relu, mode, &c).unwrap(),
                s,
                "base {base}, valeur {:?}",
                oracle(&v)
            );
            // et la valeur relue reste dans l'ulp du dernier chiffre demandé
            if !v.est_zero() {
                let ecart = (oracle(&relu) - oracle(&v)).abs() / oracle(&v).abs();
                let ulp = BigRational::new(
                    BigInt::from(2),
                    BigInt::from(base).pow(9),
                );
                assert!(ecart <= ulp, "dérive de lecture en base {base}: {s}");
            }
        }
    }
}

/* ------------------------ Zéro et signes ------------------------ */

#[test]
fn fuzz_zero_canonique() {
    let mut rng = Rng::new(0xBEEF_u64);
    for _ in 0..80 {
        let a = gen_rationnel(&mut rng);
        // a - a est le zéro canonique, sans signe
        let z = a.soustraire(&a).unwrap();
        assert!(z.est_zero());
        assert!(!z.est_negatif());
        assert!(oracle(&z).is_zero());

        // négation involutive
        assert!(a.negation().negation().egal(&a).unwrap());
        // |a| jamais négatif
        assert!(!a.abs().est_negatif());
    }
}
