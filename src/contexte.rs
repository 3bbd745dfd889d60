// src/contexte.rs
//
// Contexte de précision : base utilisateur (2..=36), chiffres significatifs,
// unité d'angle, et cache de constantes estampillé par génération.
// Le contexte est un objet explicite qui se passe d'appel en appel,
// jamais un état global caché : deux évaluations indépendantes (tests
// compris) ne peuvent pas interférer.

use std::sync::Mutex;

use crate::erreur::{ErreurCalc, Resultat};
use crate::nombre::Nombre;
use crate::rationnel::Rationnel;
use crate::transcendant;

/// Chiffres de garde (comptés dans la base utilisateur) portés par tous les
/// calculs intermédiaires avant l'arrondi final.
pub const CHIFFRES_GARDE: usize = 10;

pub const BASE_MIN: u32 = 2;
pub const BASE_MAX: u32 = 36;
const PRECISION_MAX: usize = 100_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UniteAngle {
    Radians,
    Degres,
    Grades,
}

#[derive(Debug)]
pub struct Contexte {
    base: u32,
    precision: usize,
    unite: UniteAngle,
    generation: u64,
    cache: Mutex<CacheConstantes>,
}

#[derive(Debug, Default)]
struct CacheConstantes {
    generation: u64,
    pi: Option<Rationnel>,
    e: Option<Rationnel>,
    ln2: Option<Rationnel>,
    ln_base: Option<Rationnel>,
}

impl Contexte {
    pub fn nouveau(base: u32, precision: usize) -> Resultat<Self> {
        verifier_parametres(base, precision)?;
        Ok(Contexte {
            base,
            precision,
            unite: UniteAngle::Radians,
            generation: 0,
            cache: Mutex::new(CacheConstantes::default()),
        })
    }

    /// Contexte de démarrage du moteur : décimal, 32 chiffres, radians.
    pub fn defaut() -> Self {
        Contexte {
            base: 10,
            precision: 32,
            unite: UniteAngle::Radians,
            generation: 0,
            cache: Mutex::new(CacheConstantes::default()),
        }
    }

    pub fn base(&self) -> u32 {
        self.base
    }

    pub fn precision(&self) -> usize {
        self.precision
    }

    pub fn unite(&self) -> UniteAngle {
        self.unite
    }

    /// Remplace base et précision, et invalide toutes les constantes.
    /// Rien n'est muté si les paramètres sont invalides.
    pub fn reconfigurer(&mut self, base: u32, precision: usize) -> Resultat<()> {
        verifier_parametres(base, precision)?;
        self.base = base;
        self.precision = precision;
        self.generation += 1;
        Ok(())
    }

    /// L'unité d'angle ne touche pas le cache : les facteurs de conversion
    /// sont dérivés de π à la demande.
    pub fn choisir_unite(&mut self, unite: UniteAngle) {
        self.unite = unite;
    }

    /// Chiffres internes (base 2^32) couvrant précision + garde dans la
    /// base utilisateur.
    pub fn chiffres_internes(&self) -> usize {
        let bits_par_chiffre = (32 - (self.base - 1).leading_zeros()) as usize;
        (self.precision + CHIFFRES_GARDE) * bits_par_chiffre / 32 + 2
    }

    /// Tolérance utilisateur : base^-précision.
    pub fn tolerance(&self) -> Resultat<Rationnel> {
        let den = Nombre::puissance_u32(self.base, self.precision as u64)?;
        Rationnel::nouveau(Nombre::un(), den)
    }

    /// Tolérance interne : B^-(chiffres internes), pour l'arrêt des séries.
    pub fn tolerance_interne(&self) -> Resultat<Rationnel> {
        let den = Nombre::un().decaler(self.chiffres_internes() as i64)?;
        Rationnel::nouveau(Nombre::un(), den)
    }

    /* --------- constantes en cache (π, e, ln 2, ln base) --------- */

    pub fn pi(&self) -> Resultat<Rationnel> {
        self.constante(
            |c| c.pi.clone(),
            |c, v| c.pi = Some(v),
            transcendant::calculer_pi,
        )
    }

    pub fn e(&self) -> Resultat<Rationnel> {
        self.constante(
            |c| c.e.clone(),
            |c, v| c.e = Some(v),
            transcendant::calculer_e,
        )
    }

    pub fn ln2(&self) -> Resultat<Rationnel> {
        self.constante(
            |c| c.ln2.clone(),
            |c, v| c.ln2 = Some(v),
            transcendant::calculer_ln2,
        )
    }

    pub fn ln_base(&self) -> Resultat<Rationnel> {
        self.constante(
            |c| c.ln_base.clone(),
            |c, v| c.ln_base = Some(v),
            transcendant::calculer_ln_base,
        )
    }

    /// Facteur multiplicatif amenant un angle utilisateur en radians
    /// (None en radians : aucune conversion).
    pub fn facteur_angle(&self) -> Resultat<Option<Rationnel>> {
        let diviseur = match self.unite {
            UniteAngle::Radians => return Ok(None),
            UniteAngle::Degres => 180,
            UniteAngle::Grades => 200,
        };
        let pi = self.pi()?;
        Ok(Some(pi.diviser(&Rationnel::entier(diviseur))?))
    }

    /// Consultation avec estampille : une entrée calculée sous une autre
    /// génération (base/précision périmées) n'est jamais servie. Le calcul
    /// se fait hors verrou : une constante peut en consulter une autre
    /// (ln base passe par ln 2) ; l'écriture re-vérifie la génération.
    fn constante(
        &self,
        lire: impl Fn(&CacheConstantes) -> Option<Rationnel>,
        ecrire: impl Fn(&mut CacheConstantes, Rationnel),
        calculer: impl Fn(&Contexte) -> Resultat<Rationnel>,
    ) -> Resultat<Rationnel> {
        {
            let mut cache = self.cache.lock().expect("mutex constantes");
            if cache.generation != self.generation {
                *cache = CacheConstantes {
                    generation: self.generation,
                    ..CacheConstantes::default()
                };
            }
            if let Some(v) = lire(&cache) {
                return Ok(v);
            }
        }
        let v = calculer(self)?;
        let mut cache = self.cache.lock().expect("mutex constantes");
        if cache.generation == self.generation {
            ecrire(&mut cache, v.clone());
        }
        Ok(v)
    }
}

fn verifier_parametres(base: u32, precision: usize) -> Resultat<()> {
    if !(BASE_MIN..=BASE_MAX).contains(&base) {
        return Err(ErreurCalc::Domaine(format!(
            "base {base} hors de [{BASE_MIN}, {BASE_MAX}]"
        )));
    }
    if precision == 0 {
        return Err(ErreurCalc::Domaine("précision nulle".into()));
    }
    if precision > PRECISION_MAX {
        return Err(ErreurCalc::Domaine(format!(
            "précision {precision} au-delà de la borne {PRECISION_MAX}"
        )));
    }
    Ok(())
}
